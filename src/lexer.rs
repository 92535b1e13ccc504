//! PDF lexical tokens: numbers, names, literal/hex strings, booleans, null
//! and keywords. Adapted from the teacher's `nom_parser.rs`, kept on `nom` 8
//! combinators over a `nom_locate::LocatedSpan` so that callers keep byte
//! offsets for validation-mode signals (hex-string digit counts, signature
//! `/Contents` byte ranges) without having to re-derive them from pointer
//! arithmetic.

use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_while, take_while1, take_while_m_n};
use nom::character::complete::{digit0, digit1, one_of};
use nom::character::{is_hex_digit, is_oct_digit};
use nom::combinator::{map, map_opt, map_res, opt, verify};
use nom::error::{ErrorKind, ParseError};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::AsBytes;
use nom::IResult;
use nom_locate::LocatedSpan;
use std::str::{self, FromStr};

use crate::object::{ObjectKey, StringKind};

pub type Span<'a> = LocatedSpan<&'a [u8]>;
pub type NomError<'a> = nom::error::Error<Span<'a>>;
pub type NomResult<'a, O, E = NomError<'a>> = IResult<Span<'a>, O, E>;

/// Maximum literal-string paren nesting depth tolerated. Matches the
/// teacher's `MAX_BRACKET`, which exists specifically to bound recursion on
/// adversarial input (`(((((...`).
pub const MAX_LITERAL_STRING_DEPTH: usize = 100;

#[inline]
fn convert_result<'a, O, E>(result: std::result::Result<O, E>, input: Span<'a>, kind: ErrorKind) -> NomResult<'a, O> {
    result.map(|o| (input, o)).map_err(|_| nom::Err::Error(NomError::from_error_kind(input, kind)))
}

pub fn is_whitespace(c: u8) -> bool {
    crate::cursor::is_whitespace(c)
}

fn is_delimiter(c: u8) -> bool {
    crate::cursor::is_delimiter(c)
}

fn is_regular(c: u8) -> bool {
    !is_whitespace(c) && !is_delimiter(c)
}

pub fn eol(input: Span) -> NomResult<Span> {
    alt((tag(&b"\r\n"[..]), tag(&b"\n"[..]), tag(&b"\r"[..])))(input)
}

pub fn comment(input: Span) -> NomResult<()> {
    map(tuple((tag(&b"%"[..]), take_while(|c: u8| !b"\r\n".contains(&c)), eol)), |_| ())(input)
}

fn white_space(input: Span) -> NomResult<()> {
    map(take_while(is_whitespace), |_| ())(input)
}

/// PDF "whitespace" production: runs of whitespace bytes and `%` comments.
pub fn space(input: Span) -> NomResult<()> {
    fold_many0(alt((map(take_while1(is_whitespace), |_| ()), comment)), || (), |_, _| ())(input)
}

pub fn opt_space(input: Span) -> NomResult<()> {
    map(opt(space), |_| ())(input)
}

fn sign(input: Span) -> NomResult<i64> {
    alt((map(tag(&b"+"[..]), |_| 1), map(tag(&b"-"[..]), |_| -1)))(input)
}

/// Integer token. Must hold any observed PDF integer; the spec requires
/// `i64`, so overflow past that is a grammar failure rather than silent
/// wraparound.
pub fn integer(input: Span) -> NomResult<i64> {
    let (i, (s, digits)) = pair(opt(sign), digit1)(input)?;
    let value: i64 = convert_result(i64::from_str(str::from_utf8(digits.as_bytes()).unwrap()), i, ErrorKind::Digit)?.1;
    Ok((i, s.unwrap_or(1) * value))
}

/// Real (floating point) token: sign, digits and one optional decimal point,
/// optional exponent.
pub fn real(input: Span) -> NomResult<f64> {
    let (i, _) = pair(
        opt(sign),
        alt((
            map(tuple((digit1, tag(&b"."[..]), digit0, opt(exponent))), |_| ()),
            map(tuple((tag(&b"."[..]), digit1, opt(exponent))), |_| ()),
            map(tuple((digit1, exponent)), |_| ()),
        )),
    )(input)?;
    let consumed = input.len() - i.len();
    let text = str::from_utf8(&input.as_bytes()[..consumed]).unwrap();
    convert_result(f64::from_str(text), i, ErrorKind::Float)
}

fn exponent(input: Span) -> NomResult<()> {
    map(tuple((one_of("eE"), opt(one_of("+-")), digit1)), |_| ())(input)
}

fn hex_digit(input: Span) -> NomResult<u8> {
    map_opt(take(1usize), |c: Span| str::from_utf8(c.as_bytes()).ok().and_then(|c| u8::from_str_radix(c, 16).ok()))(
        input,
    )
}

/// Up to 3 octal digits, per the literal-string `\ddd` escape. Overflow past
/// a single byte is silently truncated, matching the teacher's
/// `nom_parser.rs` comment ("Spec requires us to ignore any overflow").
fn oct_value(input: Span) -> NomResult<u8> {
    map_res(take_while_m_n(1, 3, is_oct_digit), |s: Span| {
        u16::from_str_radix(str::from_utf8(s.as_bytes()).unwrap(), 8).map(|v| (v & 0xFF) as u8)
    })(input)
}

/// `#HH` name escape. `#` followed by anything but two hex digits is literal,
/// tolerating pre-1.2 names that use `#` unescaped.
fn hex_char(input: Span) -> NomResult<u8> {
    map_res(
        verify(take(2usize), |h: &Span| h.as_bytes().iter().copied().all(is_hex_digit)),
        |x: Span| u8::from_str_radix(str::from_utf8(x.as_bytes()).unwrap(), 16),
    )(input)
}

/// Name token, starting with `/`, terminated at whitespace or a delimiter.
pub fn name(input: Span) -> NomResult<Vec<u8>> {
    preceded(
        tag(&b"/"[..]),
        fold_many0(
            alt((
                preceded(tag(&b"#"[..]), hex_char),
                map_opt(take(1usize), |c: Span| if is_regular(c.as_bytes()[0]) { Some(c.as_bytes()[0]) } else { None }),
            )),
            Vec::new,
            |mut acc, b| {
                acc.push(b);
                acc
            },
        ),
    )(input)
}

fn escape_sequence(input: Span) -> NomResult<Option<u8>> {
    preceded(
        tag(&b"\\"[..]),
        alt((
            map(eol, |_| None),
            map(tag(&b"n"[..]), |_| Some(b'\n')),
            map(tag(&b"r"[..]), |_| Some(b'\r')),
            map(tag(&b"t"[..]), |_| Some(b'\t')),
            map(tag(&b"b"[..]), |_| Some(b'\x08')),
            map(tag(&b"f"[..]), |_| Some(b'\x0C')),
            map(tag(&b"("[..]), |_| Some(b'(')),
            map(tag(&b")"[..]), |_| Some(b')')),
            map(tag(&b"\\"[..]), |_| Some(b'\\')),
            map(oct_value, Some),
            map(take(1usize), |c: Span| Some(c.as_bytes()[0])),
        )),
    )(input)
}

fn is_direct_literal_byte(c: u8) -> bool {
    !b"()\\\r\n".contains(&c)
}

fn inner_literal_string(depth: usize) -> impl Fn(Span) -> NomResult<Vec<u8>> {
    move |input| {
        enum Piece<'a> {
            Direct(Span<'a>),
            Escape(Option<u8>),
            Eol(Span<'a>),
            Nested(Vec<u8>),
        }
        fold_many0(
            alt((
                map(take_while1(is_direct_literal_byte), Piece::Direct),
                map(escape_sequence, Piece::Escape),
                map(eol, Piece::Eol),
                map(nested_literal_string(depth), Piece::Nested),
            )),
            Vec::new,
            |mut acc: Vec<u8>, piece| {
                match piece {
                    Piece::Direct(s) | Piece::Eol(s) => acc.extend_from_slice(s.as_bytes()),
                    Piece::Escape(Some(b)) => acc.push(b),
                    Piece::Escape(None) => {}
                    Piece::Nested(n) => acc.extend_from_slice(&n),
                }
                acc
            },
        )(input)
    }
}

fn nested_literal_string(depth: usize) -> impl Fn(Span) -> NomResult<Vec<u8>> {
    move |input| {
        if depth == 0 {
            return Err(nom::Err::Failure(NomError::from_error_kind(input, ErrorKind::TooLarge)));
        }
        map(delimited(tag(&b"("[..]), inner_literal_string(depth - 1), tag(&b")"[..])), |mut content| {
            content.insert(0, b'(');
            content.push(b')');
            content
        })(input)
    }
}

/// Literal string: paren-balanced, with escapes/octals/line continuation.
/// Recovery for the documented "unbalanced `)` followed by `CRLF /` or `CR
/// /`" case lives in the grammar layer, not here, because it requires
/// look-ahead past the string's own grammar.
pub fn literal_string(input: Span) -> NomResult<Vec<u8>> {
    delimited(tag(&b"("[..]), inner_literal_string(MAX_LITERAL_STRING_DEPTH), tag(&b")"[..]))(input)
}

/// Hex string result: decoded bytes, total hex-digit count seen, and whether
/// every non-whitespace byte inside the delimiters was a hex digit (the
/// validation-mode "hex-only" signal).
pub struct HexStringResult {
    pub bytes: Vec<u8>,
    pub hex_digit_count: usize,
    pub hex_only: bool,
}

/// Hex string token. Whitespace inside is skipped; in lenient mode a
/// non-hex byte truncates the scan (the remaining bytes up to `>` are
/// consumed as a recovery measure by the caller).
pub fn hexadecimal_string(input: Span) -> NomResult<HexStringResult> {
    let (mut i, _) = tag(&b"<"[..])(input)?;
    let mut digits: Vec<u8> = Vec::new();
    let mut hex_only = true;
    loop {
        let (j, _) = white_space(i)?;
        i = j;
        match i.as_bytes().first() {
            Some(b'>') => break,
            Some(&b) if is_hex_digit(b) => {
                digits.push(b);
                i = i.slice_one();
            }
            Some(_) => {
                hex_only = false;
                // Recovery: skip to the next '>' or end of input.
                while let Some(&b) = i.as_bytes().first() {
                    if b == b'>' {
                        break;
                    }
                    i = i.slice_one();
                }
                break;
            }
            None => break,
        }
    }
    let (i, _) = opt(tag(&b">"[..]))(i)?;
    let hex_digit_count = digits.len();
    let mut bytes = Vec::with_capacity(digits.len() / 2 + 1);
    let mut iter = digits.chunks(2);
    for pair in &mut iter {
        let hi = (pair[0] as char).to_digit(16).unwrap() as u8;
        let lo = if pair.len() == 2 { (pair[1] as char).to_digit(16).unwrap() as u8 } else { 0 };
        bytes.push((hi << 4) | lo);
    }
    Ok((i, HexStringResult { bytes, hex_digit_count, hex_only }))
}

trait SliceOne<'a> {
    fn slice_one(self) -> Span<'a>;
}

impl<'a> SliceOne<'a> for Span<'a> {
    fn slice_one(self) -> Span<'a> {
        use nom::Slice;
        self.slice(1..)
    }
}

pub fn boolean(input: Span) -> NomResult<bool> {
    alt((map(tag(&b"true"[..]), |_| true), map(tag(&b"false"[..]), |_| false)))(input)
}

pub fn null(input: Span) -> NomResult<()> {
    map(tag(&b"null"[..]), |_| ())(input)
}

fn unsigned<I: FromStr>(input: Span) -> NomResult<I> {
    map_res(digit1, |d: Span| I::from_str(str::from_utf8(d.as_bytes()).unwrap()))(input)
}

/// `N G` pair, with the spec's bounds: object number < 10,000,000,000,
/// generation <= 65,535.
pub fn object_key(input: Span) -> NomResult<ObjectKey> {
    let (i, number) = verify(unsigned::<u64>, |n| *n < 10_000_000_000)(input)?;
    let (i, _) = space(i)?;
    let (i, generation) = unsigned::<u32>(i)?;
    let (i, _) = space(i)?;
    if generation > 65_535 {
        return Err(nom::Err::Error(NomError::from_error_kind(i, ErrorKind::Verify)));
    }
    Ok((i, ObjectKey::new(number as u32, generation as u16)))
}

pub fn keyword<'a>(word: &'static str) -> impl FnMut(Span<'a>) -> NomResult<'a, Span<'a>> {
    move |input| tag(word.as_bytes())(input)
}

/// Recognize `N G R`, consumed as a standalone reference.
pub fn reference(input: Span) -> NomResult<ObjectKey> {
    let (i, key) = object_key(input)?;
    let (i, _) = tag(&b"R"[..])(i)?;
    Ok((i, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom_locate::LocatedSpan;

    fn span(s: &[u8]) -> Span {
        LocatedSpan::new(s)
    }

    fn strip<O>(r: NomResult<O>) -> Option<O> {
        r.ok().and_then(|(i, o)| if i.is_empty() { Some(o) } else { None })
    }

    #[test]
    fn parse_numbers() {
        assert_eq!(strip(integer(span(b"-17"))), Some(-17));
        assert_eq!(strip(real(span(b"0.12"))), Some(0.12));
        assert_eq!(strip(real(span(b"-.12"))), Some(-0.12));
        assert_eq!(strip(real(span(b"10."))), Some(10.0));
        assert_eq!(strip(real(span(b"1.2e3"))), Some(1200.0));
    }

    #[test]
    fn parse_name_with_hex_escape() {
        let (_, n) = name(span(b"/ABC#5f")).unwrap();
        assert_eq!(n, b"ABC\x5F");
    }

    #[test]
    fn parse_literal_string_with_escapes_and_nesting() {
        let (_, bytes) = literal_string(span(b"(text\r\n\\\\(nested\\t\\b\\f))")).unwrap();
        assert_eq!(bytes, b"text\r\n\\(nested\t\x08\x0C)".to_vec());
    }

    #[test]
    fn parse_hex_string_skips_whitespace_and_counts_digits() {
        let (_, r) = hexadecimal_string(span(b"<9 01F A>")).unwrap();
        assert_eq!(r.bytes, vec![0x90, 0x1F, 0xA0]);
        assert_eq!(r.hex_digit_count, 5);
        assert!(r.hex_only);
    }

    #[test]
    fn hex_string_recovers_from_non_hex_byte() {
        let (_, r) = hexadecimal_string(span(b"<90zz1F>")).unwrap();
        assert!(!r.hex_only);
    }

    #[test]
    fn object_key_bounds() {
        assert!(object_key(span(b"10000000000 0 ")).is_err());
        assert!(object_key(span(b"1 65536 ")).is_err());
        assert!(strip(object_key(span(b"1 0 "))).is_some());
    }
}
