use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "flash";

pub fn flash_cookie(message: impl Into<String>) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, message.into()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn set_flash(jar: CookieJar, message: impl Into<String>) -> CookieJar {
    jar.add(flash_cookie(message))
}

/// Reads the pending flash message and clears it for the next page
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<String>) {
    let message = jar.get(FLASH_COOKIE).map(|cookie| cookie.value().to_string());

    match message {
        Some(message) => (
            jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            Some(message),
        ),
        None => (jar, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_flash_clears_cookie() {
        let jar = set_flash(CookieJar::new(), "Project updated");
        let (jar, message) = take_flash(jar);

        assert_eq!(message.as_deref(), Some("Project updated"));
        assert!(jar.get(FLASH_COOKIE).is_none());

        let (_, message) = take_flash(jar);
        assert!(message.is_none());
    }
}
