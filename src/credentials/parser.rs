use crate::credentials::CredentialSet;
use crate::CredentialError;

/// Parses a browser cookie string into a validated credential set
///
/// Pairs are separated by `;` or newlines. Segments without `=` are
/// ignored, names and values are trimmed, and everything after the first
/// `=` is the value. A required cookie with a blank value (`SESSDATA=`)
/// counts as missing, since the platform treats it as logged out.
///
/// # Returns
///
/// * `Ok(CredentialSet)` - All required cookies are present
/// * `Err(CredentialError)` - The string was blank or lacked required cookies
///
/// # Example
///
/// ```
/// use vlist_crawler::credentials::parse_credentials;
///
/// let creds = parse_credentials("SESSDATA=a; bili_jct=b; buvid3=c").unwrap();
/// assert_eq!(creds.get("bili_jct"), Some("b"));
/// ```
pub fn parse_credentials(raw: &str) -> Result<CredentialSet, CredentialError> {
    if raw.trim().is_empty() {
        return Err(CredentialError::Empty);
    }

    let mut set = CredentialSet::new();
    for segment in raw.split(|c| c == ';' || c == '\n' || c == '\r') {
        let Some((name, value)) = segment.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        set.insert(name, value.trim());
    }

    set.validate()?;
    Ok(set)
}
