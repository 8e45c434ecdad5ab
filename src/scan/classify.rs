//! Keyword heuristics for scan results.
//!
//! All inputs are expected lowercase.

/// Tokens that mark a post as offering invites.
const OFFER_TOKENS: &[&str] = &["giving", "giveaway", "offer", "[o]"];

/// Tokens that mark a post as asking for invites.
const REQUEST_TOKENS: &[&str] = &["want", "need", "looking for", "request", "[w]"];

/// Whether `title` and `body` read as an offer: an offer token somewhere and
/// no request token anywhere.
pub fn is_offer(title: &str, body: &str) -> bool {
    let has_offer = OFFER_TOKENS
        .iter()
        .any(|t| title.contains(t) || body.contains(t));
    has_offer && !is_request(title) && !is_request(body)
}

/// Whether `text` reads as a request.
pub fn is_request(text: &str) -> bool {
    REQUEST_TOKENS.iter().any(|t| text.contains(t))
}

/// Whether `text` names the tracker alongside at least one keyword.
pub fn mentions(text: &str, name: &str, keywords: &[String]) -> bool {
    !name.is_empty() && text.contains(name) && keywords.iter().any(|k| text.contains(k.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        vec!["invite".to_string(), "invites".to_string()]
    }

    #[test]
    fn test_offer_tagged_title() {
        assert!(is_offer("[o] alphatracker invites", ""));
        assert!(is_offer("giving away 3 alphatracker invites", ""));
    }

    #[test]
    fn test_offer_token_in_body() {
        assert!(is_offer("alphatracker invites", "i'm giving out two today"));
    }

    #[test]
    fn test_request_title_is_not_offer() {
        assert!(!is_offer("[w] alphatracker invite [o] ratio", ""));
        assert!(!is_offer("need alphatracker invite, will offer buffer", ""));
    }

    #[test]
    fn test_request_word_in_body_disqualifies() {
        assert!(!is_offer(
            "anyone giving alphatracker invites?",
            "i really need one, want to join"
        ));
        assert!(!is_offer("[o] alphatracker", "comment if you need one"));
    }

    #[test]
    fn test_no_offer_token() {
        assert!(!is_offer("alphatracker is great", "love the invites forum"));
    }

    #[test]
    fn test_mentions_requires_name_and_keyword() {
        let kw = keywords();
        assert!(mentions("alphatracker invites open", "alphatracker", &kw));
        assert!(!mentions("alphatracker is down", "alphatracker", &kw));
        assert!(!mentions("betatracker invites", "alphatracker", &kw));
        assert!(!mentions("invites", "", &kw));
    }
}
