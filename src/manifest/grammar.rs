//!
//! Line Grammar for Vendor Manifests
//!
//! nom combinators turning one trimmed, non-comment manifest line into a
//! source or package declaration. Source lines are tried first; a line that
//! fails as a source is re-parsed from the start as a package line.
//!

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1, satisfy};
use nom::combinator::{eof, map, not, opt, recognize, rest, value};
use nom::multi::many1_count;
use nom::sequence::{pair, preceded, terminated, tuple};

use super::{Package, Source};

/// Characters allowed in a source url besides letters and digits
const URL_EXTRA_CHARS: &str = ":/\\.-_?@&=%+~";

/// One parsed manifest line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Source(Source),
    Package(Package),
}

/// Parse a single manifest line.
///
/// Returns `None` when the line matches neither the source nor the package
/// grammar. Trailing `# comments` are accepted and dropped.
pub fn parse_line(line: &str) -> Option<Declaration> {
    match declaration(line) {
        Ok((_, decl)) => Some(decl),
        Err(_) => None,
    }
}

/// True for a line holding only a comment
pub fn is_comment(line: &str) -> bool {
    preceded(multispace0::<&str, nom::error::Error<&str>>, char('#'))(line).is_ok()
}

fn declaration(input: &str) -> IResult<&str, Declaration> {
    alt((
        map(terminated(source_line, line_end), Declaration::Source),
        map(terminated(package_line, line_end), Declaration::Package),
    ))(input)
}

fn source_line(input: &str) -> IResult<&str, Source> {
    let (input, (_, _, name, _, url)) = tuple((
        multispace0,
        terminated(tag("source"), multispace1),
        source_name,
        multispace1,
        url,
    ))(input)?;

    Ok((
        input,
        Source {
            name: name.to_string(),
            url: url.to_string(),
        },
    ))
}

fn package_line(input: &str) -> IResult<&str, Package> {
    let (input, (_, source, _, id, _, version, (folder, clean))) = tuple((
        multispace0,
        source_name,
        multispace1,
        package_id,
        multispace1,
        version,
        suffixes,
    ))(input)?;

    Ok((
        input,
        Package {
            source_name: source.to_string(),
            package_id: id.to_string(),
            package_version: version.to_string(),
            output_folder: folder.unwrap_or(id).to_string(),
            clean_on_update: clean,
        },
    ))
}

/// `[into <folder>]` and `[clean]` in either order, each at most once
fn suffixes(input: &str) -> IResult<&str, (Option<&str>, bool)> {
    alt((
        map(
            pair(
                preceded(multispace1, clean_flag),
                opt(preceded(multispace1, into_clause)),
            ),
            |(_, folder)| (folder, true),
        ),
        map(
            pair(
                opt(preceded(multispace1, into_clause)),
                opt(preceded(multispace1, clean_flag)),
            ),
            |(folder, clean)| (folder, clean.is_some()),
        ),
    ))(input)
}

fn into_clause(input: &str) -> IResult<&str, &str> {
    preceded(pair(keyword("into"), multispace1), package_id)(input)
}

fn clean_flag(input: &str) -> IResult<&str, ()> {
    value((), keyword("clean"))(input)
}

/// Whitespace then end of input or a trailing comment
fn line_end(input: &str) -> IResult<&str, ()> {
    value(
        (),
        pair(multispace0, alt((eof, recognize(pair(char('#'), rest))))),
    )(input)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag(kw), not(satisfy(is_package_id_char)))
}

fn source_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphabetic() || matches!(c, '-' | '_' | '.'))(input)
}

fn package_id(input: &str) -> IResult<&str, &str> {
    take_while1(is_package_id_char)(input)
}

fn is_package_id_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '-' | '_')
}

fn url(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || URL_EXTRA_CHARS.contains(c))(input)
}

/// Digit runs, `.digits` and `-alnum` fragments, kept verbatim
fn version(input: &str) -> IResult<&str, &str> {
    recognize(many1_count(alt((
        digit1,
        recognize(pair(char('.'), digit1)),
        recognize(pair(char('-'), take_while1(char::is_alphanumeric))),
    ))))(input)
}
