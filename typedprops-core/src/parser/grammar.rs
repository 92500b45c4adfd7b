use crate::error::Result;
use crate::parser::element::ElementParser;
use crate::property::multimap::Multimap;

/// Splits the raw string on `,` with no escaping and no trimming; every
/// token, including empty ones produced by consecutive or trailing
/// delimiters, goes through the element parser. The parse is atomic: the
/// first token that does not convert fails the whole list.
pub fn parse_list<T>(raw: &str, element: &ElementParser<T>) -> Result<Vec<T>> {
    raw.split(',').map(|token| element.parse(token)).collect()
}

/// Tokens are either `key=value` pairs or bare values appended under the most
/// recently seen key; `=` splits on the first occurrence only, so values may
/// themselves contain `=`. A bare value before any key has been seen is
/// parsed (conversion is still enforced) and then dropped. Atomic on
/// conversion failure, like [`parse_list`].
pub fn parse_multimap<T>(raw: &str, element: &ElementParser<T>) -> Result<Multimap<T>> {
    let mut result = Multimap::new();
    let mut current_key: Option<&str> = None;

    for token in raw.split(',') {
        let value = match token.split_once('=') {
            Some((key, value)) => {
                current_key = Some(key);
                value
            }
            None => token,
        };

        let parsed = element.parse(value)?;
        if let Some(key) = current_key {
            result.append(key, parsed);
        }
    }

    Ok(result)
}
