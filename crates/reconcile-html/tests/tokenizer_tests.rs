//! Integration tests for the HTML tokenizer.

use quickcheck_macros::quickcheck;
use reconcile_html::{Attribute, SpannedToken, Token, TokenKind, TokenizeError, Tokenizer, tokenize};

/// Helper to tokenize a string and return the tokens with their end offsets.
fn spanned(input: &str) -> Vec<SpannedToken> {
    tokenize(input.as_bytes()).expect("input should tokenize")
}

/// Helper to tokenize a string and return only the tokens.
fn tokens(input: &str) -> Vec<Token> {
    spanned(input).into_iter().map(|t| t.token).collect()
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

fn start(name: &str, attributes: &[(&str, &str)]) -> Token {
    Token::StartTag {
        name: name.to_string(),
        self_closing: false,
        attributes: attributes
            .iter()
            .map(|&(name, value)| Attribute::new(name, value))
            .collect(),
    }
}

fn end(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

#[test]
fn test_plain_text_is_one_token() {
    let tokens = spanned("Hello");
    assert_eq!(tokens.len(), 2); // text + EOF
    assert_eq!(tokens[0].token, text("Hello"));
    assert_eq!(tokens[0].end, 5);
    assert_eq!(tokens[1].token, Token::EndOfFile);
    assert_eq!(tokens[1].end, 5);
}

#[test]
fn test_empty_input_is_just_eof() {
    assert_eq!(tokens(""), vec![Token::EndOfFile]);
}

#[test]
fn test_offsets_follow_each_token() {
    let tokens = spanned("<ul><li>1</li></ul>");
    let ends: Vec<usize> = tokens.iter().map(|t| t.end).collect();
    assert_eq!(ends, [4, 8, 9, 14, 19, 19]);
    assert_eq!(tokens[0].token, start("ul", &[]));
    assert_eq!(tokens[2].token, text("1"));
    assert_eq!(tokens[3].token, end("li"));
}

#[test]
fn test_attributes_in_all_quoting_styles() {
    let tokens = spanned(r#"<p class="a" title='b c' id=d hidden>x</p>"#);
    assert_eq!(
        tokens[0].token,
        start(
            "p",
            &[("class", "a"), ("title", "b c"), ("id", "d"), ("hidden", "")]
        )
    );
    assert_eq!(tokens[0].end, 37);
    assert_eq!(tokens[1].token, text("x"));
}

#[test]
fn test_names_are_lowercased() {
    assert_eq!(
        tokens("<DIV ID=x></DIV>"),
        vec![start("div", &[("id", "x")]), end("div"), Token::EndOfFile]
    );
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    assert_eq!(
        tokens("<a x=1 X=2 y=3>")[0],
        start("a", &[("x", "1"), ("y", "3")])
    );
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokens("<br/>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag {
            name, self_closing, ..
        } => {
            assert_eq!(name, "br");
            assert!(self_closing);
        }
        other => panic!("Expected self-closing StartTag token, got {other:?}"),
    }
    assert_eq!(tokens[0].kind(), TokenKind::SelfClosingTag);
    assert_eq!(tokens[0].kind().to_string(), "self-closing-tag");
}

#[test]
fn test_character_references_are_decoded() {
    assert_eq!(tokens("a &lt; b &amp;&#33;")[0], text("a < b &!"));
    assert_eq!(
        tokens(r#"<a href="?x=1&amp;y=2&copy=3">"#)[0],
        start("a", &[("href", "?x=1&y=2&copy=3")])
    );
}

#[test]
fn test_comments() {
    let tokens = spanned("<!-- hi --><!----><!-->x");
    assert_eq!(
        tokens[0].token,
        Token::Comment {
            data: " hi ".to_string()
        }
    );
    assert_eq!(tokens[0].end, 11);
    assert_eq!(
        tokens[1].token,
        Token::Comment {
            data: String::new()
        }
    );
    assert_eq!(tokens[1].end, 18);
    assert_eq!(tokens[2].end, 23);
    assert_eq!(tokens[3].token, text("x"));
}

#[test]
fn test_unterminated_comment_runs_to_end() {
    assert_eq!(
        tokens("<!-- open")[0],
        Token::Comment {
            data: " open".to_string()
        }
    );
}

#[test]
fn test_doctype() {
    let tokens = spanned("<!doctype html><p>");
    assert_eq!(
        tokens[0].token,
        Token::Doctype {
            data: "html".to_string()
        }
    );
    assert_eq!(tokens[0].end, 15);
    assert_eq!(tokens[1].token, start("p", &[]));
}

#[test]
fn test_bogus_comments() {
    assert_eq!(
        tokens("<?xml version?>")[0],
        Token::Comment {
            data: "?xml version?".to_string()
        }
    );
    assert_eq!(
        tokens("</ odd>")[0],
        Token::Comment {
            data: " odd".to_string()
        }
    );
}

#[test]
fn test_lone_less_than_is_text() {
    assert_eq!(tokens("a < b <"), vec![text("a < b <"), Token::EndOfFile]);
}

#[test]
fn test_empty_end_tag_is_dropped() {
    let tokens = spanned("a</>b");
    assert_eq!(tokens[0].token, text("a"));
    assert_eq!(tokens[1].token, text("b"));
    assert_eq!(tokens[1].end, 5);
}

#[test]
fn test_script_content_is_raw() {
    assert_eq!(
        tokens("<script>if (a<b) x = '</p>&amp;';</SCRIPT>"),
        vec![
            start("script", &[]),
            text("if (a<b) x = '</p>&amp;';"),
            end("script"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_title_content_is_decoded_but_not_parsed() {
    assert_eq!(
        tokens("<title>a &amp; <b></title>"),
        vec![
            start("title", &[]),
            text("a & <b>"),
            end("title"),
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_eof_in_tag_is_an_error() {
    assert_eq!(
        tokenize(b"ab<div class"),
        Err(TokenizeError::EofInTag { offset: 2 })
    );
    assert_eq!(
        tokenize(b"<a href=\"x"),
        Err(TokenizeError::EofInTag { offset: 0 })
    );
}

#[test]
fn test_invalid_utf8_is_replaced_and_offsets_stay_raw() {
    let tokens = tokenize(b"<p t=\"\xff\">caf\xe9</p>").expect("bytes should tokenize");
    let ends: Vec<usize> = tokens.iter().map(|t| t.end).collect();
    assert_eq!(ends, [9, 13, 17, 17]);
    assert_eq!(tokens[0].token, start("p", &[("t", "\u{FFFD}")]));
    assert_eq!(tokens[1].token, text("caf\u{FFFD}"));
    assert_eq!(tokens[2].token, end("p"));
}

#[test]
fn test_invalid_utf8_in_comment() {
    assert_eq!(
        tokenize(b"<!--\xc3-->x").map(|t| t.into_iter().map(|t| t.token).collect::<Vec<_>>()),
        Ok(vec![
            Token::Comment {
                data: "\u{FFFD}".to_string()
            },
            text("x"),
            Token::EndOfFile
        ])
    );
    // an invalid byte right after `</` starts a bogus comment
    let tokens = tokenize(b"</\xffx>y").expect("bytes should tokenize");
    assert_eq!(
        tokens[0].token,
        Token::Comment {
            data: "\u{FFFD}x".to_string()
        }
    );
    assert_eq!(tokens[0].end, 5);
}

#[test]
fn test_iterator_stops_after_eof() {
    let mut tokenizer = Tokenizer::new("<p>");
    assert_eq!(tokenizer.by_ref().count(), 2);
    assert!(tokenizer.next().is_none());
    // next_token keeps answering EOF
    assert_eq!(tokenizer.next_token().map(|t| t.token), Ok(Token::EndOfFile));
}

#[quickcheck]
fn prop_stream_ends_with_single_eof_and_offsets_grow(input: String) -> bool {
    match tokenize(input.as_bytes()) {
        Ok(tokens) => {
            let eofs = tokens.iter().filter(|t| t.token.is_eof()).count();
            let last_is_eof = tokens.last().is_some_and(|t| t.token.is_eof());
            let monotonic = tokens.windows(2).all(|w| w[0].end <= w[1].end);
            let in_bounds = tokens.iter().all(|t| t.end <= input.len());
            eofs == 1 && last_is_eof && monotonic && in_bounds
        }
        Err(TokenizeError::EofInTag { offset }) => input[offset..].starts_with('<'),
    }
}

#[quickcheck]
fn prop_arbitrary_bytes_keep_offsets_in_bounds(input: Vec<u8>) -> bool {
    match tokenize(&input) {
        Ok(tokens) => {
            let monotonic = tokens.windows(2).all(|w| w[0].end <= w[1].end);
            monotonic && tokens.last().is_some_and(|t| t.end == input.len())
        }
        Err(TokenizeError::EofInTag { offset }) => input.get(offset) == Some(&b'<'),
    }
}
