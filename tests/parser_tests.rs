use serde_dsv::{CsvOptions, Error, FieldBuilder, Parser, Token, TokenKind};

fn field(s: &str) -> Token {
    Token::Field(Some(s.to_string()))
}

fn collect(input: &str, options: &CsvOptions) -> Vec<Token> {
    let mut parser = Parser::from_str_with_options(input, options).unwrap();
    let mut tokens = Vec::new();
    loop {
        let token = parser.read().unwrap().clone();
        let done = token == Token::EndOfData;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[test]
fn test_mixed_record_token_by_token() {
    let mut parser = Parser::from_str("abcdefgh,12345,,abcdefgh,*+\n");
    assert_eq!(parser.read().unwrap(), &field("abcdefgh"));
    assert_eq!(parser.read().unwrap(), &field("12345"));
    assert_eq!(parser.read().unwrap(), &Token::Field(None));
    assert_eq!(parser.read().unwrap(), &field("abcdefgh"));
    assert_eq!(parser.read().unwrap(), &field("*+"));
    assert_eq!(parser.read().unwrap(), &Token::EndOfRecord);
    assert_eq!(parser.read().unwrap(), &Token::EndOfData);
}

#[test]
fn test_null_versus_empty_string() {
    let tokens = collect("\"\",,x\n", &CsvOptions::new());
    assert_eq!(
        tokens,
        vec![
            field(""),
            Token::Field(None),
            field("x"),
            Token::EndOfRecord,
            Token::EndOfData
        ]
    );
}

#[test]
fn test_terminal_state_is_idempotent() {
    let mut parser = Parser::from_str("a\n");
    parser.read().unwrap();
    parser.read().unwrap();
    assert_eq!(parser.read().unwrap().kind(), TokenKind::EndOfData);
    for _ in 0..3 {
        assert_eq!(parser.read().unwrap(), &Token::EndOfData);
        assert_eq!(parser.skip().unwrap(), &Token::EndOfData);
    }
}

#[test]
fn test_quoted_fields_keep_separators() {
    let tokens = collect("\"a,b\",\"line\nbreak\",\"say \"\"hi\"\"\"\n", &CsvOptions::new());
    assert_eq!(
        tokens,
        vec![
            field("a,b"),
            field("line\nbreak"),
            field("say \"hi\""),
            Token::EndOfRecord,
            Token::EndOfData
        ]
    );
}

#[test]
fn test_quote_inside_unquoted_field_is_literal() {
    let tokens = collect("ab\"c,d\n", &CsvOptions::new());
    assert_eq!(
        tokens,
        vec![field("ab\"c"), field("d"), Token::EndOfRecord, Token::EndOfData]
    );
}

#[test]
fn test_escape_inside_quotes() {
    let options = CsvOptions::new().with_escape('\\');
    let tokens = collect("\"a\\\"b\",c\n", &options);
    assert_eq!(
        tokens,
        vec![field("a\"b"), field("c"), Token::EndOfRecord, Token::EndOfData]
    );
}

#[test]
fn test_custom_separators() {
    let options = CsvOptions::new()
        .with_field_separator('|')
        .with_record_separator("\r\n");
    let tokens = collect("a|b\r\nc|\r\n", &options);
    assert_eq!(
        tokens,
        vec![
            field("a"),
            field("b"),
            Token::EndOfRecord,
            field("c"),
            Token::Field(None),
            Token::EndOfRecord,
            Token::EndOfData
        ]
    );
}

#[test]
fn test_record_separator_starting_inside_partial_match() {
    let options = CsvOptions::new().with_record_separator("\r\r\n");
    let tokens = collect("x\r\r\r\ny\r\r\n", &options);
    assert_eq!(
        tokens,
        vec![
            field("x\r"),
            Token::EndOfRecord,
            field("y"),
            Token::EndOfRecord,
            Token::EndOfData
        ]
    );
}

#[test]
fn test_partial_record_separator_is_content() {
    let options = CsvOptions::rfc4180();
    let tokens = collect("a\rb,c\r\r\n", &options);
    assert_eq!(
        tokens,
        vec![
            field("a\rb"),
            field("c\r"),
            Token::EndOfRecord,
            Token::EndOfData
        ]
    );
}

#[test]
fn test_multibyte_characters() {
    let tokens = collect("héllo,日本\n", &CsvOptions::new());
    assert_eq!(
        tokens,
        vec![field("héllo"), field("日本"), Token::EndOfRecord, Token::EndOfData]
    );
}

#[test]
fn test_unterminated_quote_is_fatal() {
    let mut parser = Parser::from_str("a,\"bc");
    assert_eq!(parser.read().unwrap(), &field("a"));
    assert!(matches!(
        parser.read(),
        Err(Error::MalformedQuoting { record: 0, field: 1 })
    ));
    assert!(matches!(parser.read(), Err(Error::Unusable)));
}

#[test]
fn test_invalid_utf8_is_fatal() {
    let bytes: &[u8] = b"ok\n\xff\xfe\n";
    let mut parser = Parser::new(bytes, &CsvOptions::new()).unwrap();
    assert_eq!(parser.read_record().unwrap(), Some(vec![Some("ok".to_string())]));
    assert!(matches!(
        parser.read_record(),
        Err(Error::InvalidEncoding { record: 1 })
    ));
}

#[test]
fn test_read_record_and_indices() {
    let mut parser = Parser::from_str("a,b\nc\n");
    assert_eq!(
        parser.read_record().unwrap(),
        Some(vec![Some("a".to_string()), Some("b".to_string())])
    );
    assert_eq!(parser.record_index(), 1);
    assert_eq!(parser.field_index(), 0);
    assert_eq!(parser.read_record().unwrap(), Some(vec![Some("c".to_string())]));
    assert_eq!(parser.read_record().unwrap(), None);
}

#[test]
fn test_take_current_value_moves_text_out() {
    let mut parser = Parser::from_str("abc\n");
    parser.read().unwrap();
    assert_eq!(parser.current_value(), Some("abc"));
    assert_eq!(parser.take_current_value(), Some("abc".to_string()));
    assert_eq!(parser.take_current_value(), None);
    assert_eq!(parser.current_token(), &Token::Field(None));
}

#[test]
fn test_invalid_options_rejected() {
    let options = CsvOptions::new().with_field_separator('"');
    assert!(matches!(
        Parser::from_str_with_options("a", &options),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_field_builder_mark_and_rollback() {
    let mut field = FieldBuilder::new();
    field.push_str("abc");
    field.mark();
    field.push_str("def");
    assert_eq!(field.len(), 6);
    field.rollback();
    assert_eq!(field.as_str(), "abc");
    assert!(!field.is_marked());
}

#[test]
fn test_field_builder_second_mark_invalidates() {
    let mut field = FieldBuilder::new();
    field.push_str("abc");
    field.mark();
    field.push('d');
    field.mark();
    field.push('e');
    field.rollback();
    assert!(field.is_empty());
}
