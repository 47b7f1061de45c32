use pretty_assertions::assert_eq;
use xdebug_calltree::parser::{CachegrindParser, FunctionKind, NameTable, Token};
use xdebug_calltree::utils::error::ParseError;

const FIXTURE: &str = include_str!("fixtures/single_run.cg");

#[test]
fn test_fixture_round_trips_byte_for_byte() {
    let mut names = NameTable::new();
    let body = CachegrindParser::new(FIXTURE).get_body(&mut names).unwrap();

    assert_eq!(body.header.cmd, "/var/www/a.php");
    assert_eq!(body.entries.len(), 22);
    assert_eq!(body.to_cachegrind(&names), FIXTURE);
}

#[test]
fn test_fixture_names_are_interned_once() {
    let mut names = NameTable::new();
    let body = CachegrindParser::new(FIXTURE).get_body(&mut names).unwrap();

    let bar: Vec<_> = body
        .entries
        .iter()
        .filter(|e| names.function(e.function) == "bar")
        .map(|e| e.function)
        .collect();
    assert_eq!(bar.len(), 4);
    assert!(bar.windows(2).all(|w| w[0] == w[1]));

    let main = body.entries.last().unwrap();
    assert_eq!(names.function(main.function), "{main}");
    assert_eq!(main.summary, Some(401402));
}

#[test]
fn test_inclusion_pseudo_calls() {
    let mut names = NameTable::new();
    let body = CachegrindParser::new(FIXTURE).get_body(&mut names).unwrap();

    let require = body.entries[0].function;
    assert_eq!(names.function_kind(require), FunctionKind::RequireOnce);
    assert_eq!(names.clean_label(require), "/b.php");

    let define = body.entries[1].function;
    assert_eq!(names.function_kind(define), FunctionKind::Php);
    assert_eq!(names.clean_label(define), "define");
}

#[test]
fn test_call_target_right_after_file_is_rejected() {
    let source = "version: 0.9.6\ncmd: /a.php\npart: 1\n\nevents: Time\n\nfl=/a.php\ncfn=foo\n";
    let mut names = NameTable::new();
    let err = CachegrindParser::new(source).get_body(&mut names).unwrap_err();

    match err {
        ParseError::Grammar { line_no, line, token } => {
            assert_eq!(line_no, 8);
            assert_eq!(line, "cfn=foo");
            assert_eq!(token, Some(Token::CallTarget));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = CachegrindParser::open("/nonexistent/cachegrind.out").unwrap_err();
    assert!(matches!(err, ParseError::IoError(_)));
    assert_eq!(err.line_no(), None);
}

#[test]
fn test_shared_table_across_files() {
    let mut names = NameTable::new();
    let first = CachegrindParser::new(FIXTURE).get_body(&mut names).unwrap();
    let functions = names.function_count();
    let second = CachegrindParser::new(FIXTURE).get_body(&mut names).unwrap();

    assert_eq!(names.function_count(), functions);
    assert_eq!(first.entries, second.entries);
}
