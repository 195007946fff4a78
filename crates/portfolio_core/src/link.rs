//! Secure submission links handed to portfolio companies.
//!
//! The token is only an unguessable string; nothing in this crate validates
//! it on the way back in.

use url::Url;

/// Builds `<base_url>?company=<company_name>&token=<access_token>`.
///
/// Query values are form-encoded; existing query pairs on `base_url` are kept.
pub fn submission_link(
    base_url: &str,
    company_name: &str,
    access_token: &str,
) -> Result<String, url::ParseError> {
    let url = Url::parse_with_params(
        base_url.trim(),
        &[("company", company_name), ("token", access_token)],
    )?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::submission_link;

    #[test]
    fn link_encodes_company_name_and_token() {
        let link = submission_link(
            "https://updates.example.com/submit",
            "O'Brien & Co",
            "Tok3n",
        )
        .unwrap();
        assert_eq!(
            link,
            "https://updates.example.com/submit?company=O%27Brien+%26+Co&token=Tok3n"
        );
    }

    #[test]
    fn link_keeps_existing_query_pairs() {
        let link = submission_link("https://forms.example.com/?lang=en", "Acme", "t").unwrap();
        assert_eq!(link, "https://forms.example.com/?lang=en&company=Acme&token=t");
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(submission_link("/submit", "Acme", "t").is_err());
    }
}
