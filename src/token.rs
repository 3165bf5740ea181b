const TOKEN_PREFIXES: [&str; 2] = ["ExponentPushToken[", "ExpoPushToken["];

/// Returns `true` if `token` has the shape of an Expo push token.
///
/// Accepts the bracketed form (`ExponentPushToken[..]` / `ExpoPushToken[..]`) and the bare
/// 8-4-4-4-12 alphanumeric form. This is a syntactic check only.
pub fn is_expo_push_token(token: &str) -> bool {
    is_bracketed_token(token) || is_uuid_shaped(token)
}

fn is_bracketed_token(token: &str) -> bool {
    TOKEN_PREFIXES.iter().any(|prefix| {
        token
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(']'))
            .is_some_and(|id| !id.is_empty())
    })
}

fn is_uuid_shaped(token: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let parts: Vec<&str> = token.split('-').collect();
    parts.len() == GROUPS.len()
        && parts.iter().zip(GROUPS).all(|(part, len)| {
            part.len() == len && part.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
