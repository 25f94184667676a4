use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use strum::{AsRefStr, EnumString};
use tracing::debug;

pub const FLASH_COOKIE: &str = "itinera_flash";

/// Upper bound on the encoded cookie value. Browsers drop cookies past ~4 KB,
/// and the jar may percent-encode the value once more on the way out.
const MAX_ENCODED_LEN: usize = 1024;

/// Visual category of a flash message; maps to a CSS class in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Warning,
    Danger,
}

/// One-shot notice carried across a redirect in a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn warning(message: impl Into<String>) -> Self {
        Self { category: FlashCategory::Warning, message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { category: FlashCategory::Danger, message: message.into() }
    }

    /// URL-encodes `category|message`, cutting the message at a char
    /// boundary (with a trailing `…`) once the value would exceed
    /// [`MAX_ENCODED_LEN`].
    fn encode(&self) -> String {
        let raw = format!("{}|{}", self.category.as_ref(), self.message);
        let full = urlencoding::encode(&raw);
        if full.len() <= MAX_ENCODED_LEN {
            return full.into_owned();
        }

        let ellipsis = urlencoding::encode("…");
        let budget = MAX_ENCODED_LEN - ellipsis.len();
        let mut out = urlencoding::encode(&format!("{}|", self.category.as_ref())).into_owned();
        let mut buf = [0u8; 4];
        for c in self.message.chars() {
            let piece = urlencoding::encode(c.encode_utf8(&mut buf));
            if out.len() + piece.len() > budget {
                break;
            }
            out.push_str(&piece);
        }
        out.push_str(&ellipsis);
        out
    }

    fn decode(value: &str) -> Option<Self> {
        let raw = urlencoding::decode(value).ok()?;
        let (category, message) = raw.split_once('|')?;
        Some(Self { category: category.parse().ok()?, message: message.to_string() })
    }
}

pub fn set(jar: CookieJar, flash: &Flash) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, flash.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Reads and clears the pending flash message.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let flash = Flash::decode(cookie.value());
    if flash.is_none() {
        debug!("discarding unreadable flash cookie");
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), flash)
}
