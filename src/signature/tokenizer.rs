//! Splitting signatures into complete types.
//!
//! A complete type is the shortest prefix of a signature that fully
//! describes one value: `i`, `a(is)`, `a{sv}`. Bracket counting only
//! considers the class of the opening bracket, so `(` is balanced against
//! `)` and `{` against `}` independently of each other.

use crate::error::{Error, Result};
use crate::primitives::{Primitive, WILDCARD};

/// Splits the first complete type off `sig`, returning it together with the
/// rest of the signature.
///
/// An empty `sig` is an error; callers detect the end of a signature by
/// checking for emptiness before calling.
pub fn next_complete_type(sig: &str) -> Result<(&str, &str)> {
    let len = complete_type_len(sig)?;
    Ok(sig.split_at(len))
}

fn complete_type_len(sig: &str) -> Result<usize> {
    let bytes = sig.as_bytes();
    if bytes.is_empty() {
        return Err(Error::EmptySignature);
    }

    // Each leading `a` absorbs exactly one following complete type.
    let arrays = bytes.iter().take_while(|&&c| c == b'a').count();
    let start = arrays;
    let element_len = match bytes.get(start) {
        None => return Err(Error::InvalidSignature(sig.to_owned())),
        Some(&c) if c == WILDCARD || Primitive::from_code(c).is_some() => 1,
        Some(&open) if open == b'(' || open == b'{' => {
            let close = if open == b'(' { b')' } else { b'}' };
            let mut depth = 0usize;
            let mut len = None;
            for (i, &c) in bytes[start..].iter().enumerate() {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        len = Some(i + 1);
                        break;
                    }
                }
            }
            len.ok_or_else(|| Error::MismatchedSignatureBracketing(start, sig.to_owned()))?
        }
        Some(&c) => return Err(Error::UnrecognizedSignatureCharacter(c as char)),
    };

    Ok(start + element_len)
}

/// Checks that `sig` is exactly one complete type.
pub fn expect_single_type(sig: &str) -> Result<()> {
    let (_, rest) = next_complete_type(sig)?;
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidSignature(sig.to_owned()))
    }
}

/// Splits an entire signature into its complete types. An empty signature
/// has no types.
pub fn tokenize_all(sig: &str) -> Result<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut rest = sig;
    while !rest.is_empty() {
        let (token, tail) = next_complete_type(rest)?;
        tokens.push(token);
        rest = tail;
    }
    Ok(tokens)
}

/// Returns the key and value signatures of a dictionary signature
/// `a{KV}`.
pub fn dictionary_key_value(sig: &str) -> Result<(&str, &str)> {
    let invalid = || Error::InvalidDictionarySignature(sig.to_owned());
    if !sig.starts_with("a{") {
        return Err(invalid());
    }

    let (entry, rest) = next_complete_type(&sig[1..])?;
    if !rest.is_empty() || entry.len() < 4 {
        return Err(invalid());
    }

    let inner = &entry[1..entry.len() - 1];
    let (key, rest) = next_complete_type(inner)?;
    if rest.is_empty() {
        return Err(invalid());
    }
    let (value, rest) = next_complete_type(rest)?;
    if !rest.is_empty() {
        return Err(invalid());
    }
    Ok((key, value))
}

/// Returns the field signatures of a struct signature `(...)`.
pub fn struct_fields(sig: &str) -> Result<Vec<&str>> {
    if sig.len() < 3 || !sig.starts_with('(') || !sig.ends_with(')') {
        return Err(Error::InvalidStructSignature(sig.to_owned()));
    }
    tokenize_all(&sig[1..sig.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::{
        dictionary_key_value, expect_single_type, next_complete_type, struct_fields, tokenize_all,
    };
    use crate::error::{Error, Result};
    use test_log::test;

    #[test]
    fn single_types() -> Result<()> {
        assert_eq!(next_complete_type("ii")?, ("i", "i"));
        assert_eq!(next_complete_type("a(is)si")?, ("a(is)", "si"));
        assert_eq!(next_complete_type("a{sv}")?, ("a{sv}", ""));
        assert_eq!(next_complete_type("aai")?, ("aai", ""));
        assert_eq!(next_complete_type("((ii)s)y")?, ("((ii)s)", "y"));
        assert_eq!(next_complete_type("*s")?, ("*", "s"));
        Ok(())
    }

    #[test]
    fn tokenize() -> Result<()> {
        assert_eq!(tokenize_all("ii")?, vec!["i", "i"]);
        assert_eq!(tokenize_all("a(is)si")?, vec!["a(is)", "s", "i"]);
        assert_eq!(tokenize_all("a{sv}a{s(ii)}v")?, vec!["a{sv}", "a{s(ii)}", "v"]);
        assert!(tokenize_all("")?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed() {
        assert_eq!(next_complete_type(""), Err(Error::EmptySignature));
        assert_eq!(
            next_complete_type("("),
            Err(Error::MismatchedSignatureBracketing(0, "(".to_owned()))
        );
        assert_eq!(
            next_complete_type("a"),
            Err(Error::InvalidSignature("a".to_owned()))
        );
        assert_eq!(
            next_complete_type("a{s"),
            Err(Error::MismatchedSignatureBracketing(1, "a{s".to_owned()))
        );
        assert_eq!(
            next_complete_type("z"),
            Err(Error::UnrecognizedSignatureCharacter('z'))
        );
        assert_eq!(
            next_complete_type(")"),
            Err(Error::UnrecognizedSignatureCharacter(')'))
        );
        assert!(tokenize_all("i(").is_err());
    }

    #[test]
    fn mixed_brackets_are_counted_per_class() -> Result<()> {
        // Only `(`/`)` are counted for a struct, so a stray `}` inside is
        // carried along.
        assert_eq!(next_complete_type("(i})")?, ("(i})", ""));
        Ok(())
    }

    #[test]
    fn long_array_prefix() {
        let sig = "a".repeat(100_000);
        assert!(next_complete_type(&sig).is_err());
        let sig = format!("{}i", sig);
        assert_eq!(next_complete_type(&sig).map(|(t, _)| t.len()), Ok(100_001));
    }

    #[test]
    fn single_type() {
        assert_eq!(expect_single_type("a{sv}"), Ok(()));
        assert_eq!(
            expect_single_type("ii"),
            Err(Error::InvalidSignature("ii".to_owned()))
        );
        assert_eq!(expect_single_type(""), Err(Error::EmptySignature));
    }

    #[test]
    fn dictionaries() -> Result<()> {
        assert_eq!(dictionary_key_value("a{sv}")?, ("s", "v"));
        assert_eq!(dictionary_key_value("a{s(ii)}")?, ("s", "(ii)"));
        assert_eq!(dictionary_key_value("a{sa{sv}}")?, ("s", "a{sv}"));
        assert_eq!(dictionary_key_value("a{s*}")?, ("s", "*"));
        assert!(dictionary_key_value("a{s}").is_err());
        assert!(dictionary_key_value("a{}").is_err());
        assert!(dictionary_key_value("a{sss}").is_err());
        assert!(dictionary_key_value("a{ss}i").is_err());
        assert!(dictionary_key_value("a{s").is_err());
        assert!(dictionary_key_value("(ss)").is_err());
        Ok(())
    }

    #[test]
    fn structs() -> Result<()> {
        assert_eq!(struct_fields("(si)")?, vec!["s", "i"]);
        assert_eq!(struct_fields("(a{sv}(ii))")?, vec!["a{sv}", "(ii)"]);
        assert_eq!(
            struct_fields("()"),
            Err(Error::InvalidStructSignature("()".to_owned()))
        );
        assert!(struct_fields("(i").is_err());
        assert!(struct_fields("(i)(i)").is_err());
        assert!(struct_fields("i").is_err());
        Ok(())
    }
}
