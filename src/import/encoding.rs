use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::importer::ImportError;

/// Encodes file content for the `content` column.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Decodes a base64 `content` column into UTF-8 text.
pub fn decode_content(raw: &str) -> Result<String, ImportError> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| ImportError::MalformedEncoding {
            message: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| ImportError::MalformedEncoding {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn decodes_base64_text() {
        assert_eq!(decode_content("eDt5").unwrap(), "x;y");
    }

    #[test]
    fn encoded_content_decodes_back() {
        let content = "ls /;cat /a/b.txt;тест";
        assert_eq!(decode_content(&encode_content(content)).unwrap(), content);
    }

    #[rstest]
    #[case("not base64!")]
    #[case("eDt")]
    #[case("//79")]
    fn rejects_malformed_or_non_utf8_input(#[case] raw: &str) {
        assert!(matches!(
            decode_content(raw),
            Err(ImportError::MalformedEncoding { .. })
        ));
    }
}
