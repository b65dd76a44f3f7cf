use super::*;
use crate::context::VerbosityLevel;
use libtailor::{Config, TailorError};

fn context(color: ColorChoice) -> AppContext {
    AppContext {
        config: Config::default(),
        color,
        verbosity: VerbosityLevel::Normal,
    }
}

#[test]
fn test_color_choice_from_string() {
    assert_eq!(ColorChoice::from("always"), ColorChoice::Always);
    assert_eq!(ColorChoice::from("NEVER"), ColorChoice::Never);
    assert_eq!(ColorChoice::from("auto"), ColorChoice::Auto);
    assert_eq!(ColorChoice::from("invalid"), ColorChoice::Auto);
}

#[test]
fn test_should_color_follows_explicit_choice() {
    assert!(should_color(&context(ColorChoice::Always)));
    assert!(!should_color(&context(ColorChoice::Never)));
}

#[test]
fn test_plain_spinner_is_hidden() {
    let spinner = PlainFormatter.spinner("resolving");
    assert!(spinner.is_hidden());
    spinner.finish_and_clear();
}

#[test]
fn test_formatters_do_not_panic() {
    let formatter = create_formatter(&context(ColorChoice::Never));
    formatter.success("done");
    formatter.error("failed");

    TtyFormatter.success("done");
    TtyFormatter.error("failed");
}

#[test]
fn test_error_chain_lists_causes() {
    let err = TailorError::tag_list_unavailable(
        "library/ubuntu",
        Some(TailorError::unexpected_status("HTTP 502 from mirror", 502)),
    );

    let rendered = error_chain(&err);

    assert_eq!(
        rendered,
        "Tag list unavailable for library/ubuntu: no endpoint responded\n  caused by: Transport error: HTTP 502 from mirror"
    );
}

#[test]
fn test_error_chain_without_cause() {
    let err = TailorError::unknown_tag("team/app", "v9");
    assert_eq!(error_chain(&err), "Unknown tag: team/app:v9");
}
