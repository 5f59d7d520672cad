//! Brazilian identifiers and formatting helpers.
//!
//! CPF and CNPJ carry valid mod-11 check digits and card numbers a valid Luhn
//! digit. Card numbers, phones, postcodes and MAC addresses start from the
//! `fake` pt-BR generators. Most identifiers come out in one of several layouts (punctuated,
//! digits only, spaced, mixed) so downstream extractors see realistic variety.

use fake::faker::address::raw::PostCode;
use fake::faker::creditcard::raw::CreditCardNumber;
use fake::faker::internet::raw::MACAddress;
use fake::faker::phone_number::raw::CellNumber;
use fake::locales::PT_BR;
use fake::Fake;
use rand::seq::IndexedRandom;
use rand::Rng;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// State abbreviations used for OAB registrations and addresses.
pub const UFS: [&str; 27] = [
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB", "PR",
    "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

const EMAIL_DOMAINS: [&str; 4] = [
    "empresa.com.br",
    "provedor.org",
    "corporate.net",
    "br.corp.net",
];

const CNPJ_WEIGHTS_FIRST: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_SECOND: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

// ---------------------------------------------------------------------------
// Digit helpers
// ---------------------------------------------------------------------------

fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.random_range(0..10u8)).collect()
}

fn digits_of(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| c.to_digit(10))
        .filter_map(|d| u8::try_from(d).ok())
        .collect()
}

fn digits_to_string(digits: &[u8]) -> String {
    digits
        .iter()
        .filter_map(|d| char::from_digit(u32::from(*d), 10))
        .collect()
}

/// `len` random decimal digits as text (leading zeros allowed).
pub fn digit_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    digits_to_string(&random_digits(rng, len))
}

/// Mod-11 check digit as used by CPF and CNPJ.
fn mod11_check_digit(digits: &[u8], weights: impl Iterator<Item = u32>) -> u8 {
    let sum = digits.iter().zip(weights).fold(0u32, |acc, (d, w)| {
        acc.wrapping_add(u32::from(*d).wrapping_mul(w))
    });
    match sum.checked_rem(11) {
        Some(rem) if rem >= 2 => u8::try_from(11u32.wrapping_sub(rem)).unwrap_or(0),
        _ => 0,
    }
}

/// Split `digits` into groups of `sizes` and join them with `seps`.
///
/// `seps[i]` follows group `i`; whatever remains after the last size is
/// appended as the final group.
pub fn layout(digits: &str, sizes: &[usize], seps: &[&str]) -> String {
    let mut out = String::with_capacity(digits.len().saturating_add(seps.len()));
    let mut rest = digits;
    for (size, sep) in sizes.iter().zip(seps) {
        let Some((head, tail)) = rest.split_at_checked(*size) else {
            break;
        };
        out.push_str(head);
        out.push_str(sep);
        rest = tail;
    }
    out.push_str(rest);
    out
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Eleven CPF digits with valid check digits, unformatted.
pub fn cpf_digits<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = random_digits(rng, 9);
    let first = mod11_check_digit(&digits, (2..=10).rev());
    digits.push(first);
    let second = mod11_check_digit(&digits, (2..=11).rev());
    digits.push(second);
    digits_to_string(&digits)
}

/// Whether an 11-digit string (separators ignored) is a valid CPF.
pub fn is_valid_cpf(text: &str) -> bool {
    let digits = digits_of(text);
    let [body @ .., d1, d2] = digits.as_slice() else {
        return false;
    };
    if body.len() != 9 {
        return false;
    }
    let first = mod11_check_digit(body, (2..=10).rev());
    let mut with_first = body.to_vec();
    with_first.push(first);
    first == *d1 && mod11_check_digit(&with_first, (2..=11).rev()) == *d2
}

/// CPF in one of four layouts.
pub fn cpf<R: Rng + ?Sized>(rng: &mut R) -> String {
    let base = cpf_digits(rng);
    let seps: &[&str] = match rng.random_range(0..4u8) {
        0 => &[".", ".", "-"],
        1 => &["", "", ""],
        2 => &[" ", " ", " "],
        _ => &[".", " ", "-"],
    };
    layout(&base, &[3, 3, 3], seps)
}

/// Fourteen CNPJ digits with valid check digits, unformatted.
pub fn cnpj_digits<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = random_digits(rng, 8);
    digits.extend([0, 0, 0, 1]);
    let first = mod11_check_digit(&digits, CNPJ_WEIGHTS_FIRST.into_iter());
    digits.push(first);
    let second = mod11_check_digit(&digits, CNPJ_WEIGHTS_SECOND.into_iter());
    digits.push(second);
    digits_to_string(&digits)
}

/// Whether a 14-digit string (separators ignored) is a valid CNPJ.
pub fn is_valid_cnpj(text: &str) -> bool {
    let digits = digits_of(text);
    let [body @ .., d1, d2] = digits.as_slice() else {
        return false;
    };
    if body.len() != 12 {
        return false;
    }
    let first = mod11_check_digit(body, CNPJ_WEIGHTS_FIRST.into_iter());
    let mut with_first = body.to_vec();
    with_first.push(first);
    first == *d1 && mod11_check_digit(&with_first, CNPJ_WEIGHTS_SECOND.into_iter()) == *d2
}

/// CNPJ in one of three layouts.
pub fn cnpj<R: Rng + ?Sized>(rng: &mut R) -> String {
    let base = cnpj_digits(rng);
    let seps: &[&str] = match rng.random_range(0..3u8) {
        0 => &[".", ".", "/", "-"],
        1 => &["", "", "", ""],
        _ => &[" ", " ", " ", " "],
    };
    layout(&base, &[2, 3, 3, 4], seps)
}

/// RG in the São Paulo layout (`12.345.678-9`).
pub fn rg<R: Rng + ?Sized>(rng: &mut R) -> String {
    layout(&digit_string(rng, 9), &[2, 3, 3], &[".", ".", "-"])
}

/// Eleven-digit driver's licence number.
pub fn cnh<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = rng.random_range(1..10u8).to_string();
    number.push_str(&digit_string(rng, 10));
    number
}

/// Bar registration (`123456/BA`).
pub fn oab<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(4..=6usize);
    format!("{}/{}", digit_string(rng, len), pick(rng, &UFS))
}

/// Visa, Mastercard or Amex number with a valid Luhn digit, grouped by four.
pub fn credit_card<R: Rng + ?Sized>(rng: &mut R) -> String {
    let drawn: String = CreditCardNumber(PT_BR).fake_with_rng(rng);
    let mut digits = digits_of(&drawn);
    // The generator's check digit is only right for even lengths.
    digits.pop();
    digits.push(luhn_check_digit(&digits));
    layout(&digits_to_string(&digits), &[4, 4, 4], &[" ", " ", " "])
}

fn luhn_check_digit(body: &[u8]) -> u8 {
    // Doubling starts at the rightmost body digit.
    let sum = body.iter().rev().enumerate().fold(0u32, |acc, (i, d)| {
        let d = u32::from(*d);
        let value = if i.checked_rem(2) == Some(0) {
            let doubled = d.wrapping_mul(2);
            if doubled > 9 {
                doubled.wrapping_sub(9)
            } else {
                doubled
            }
        } else {
            d
        };
        acc.wrapping_add(value)
    });
    let rem = sum.checked_rem(10).unwrap_or(0);
    u8::try_from(10u32.wrapping_sub(rem).checked_rem(10).unwrap_or(0)).unwrap_or(0)
}

/// Whether a card number (separators ignored) passes the Luhn check.
pub fn is_valid_luhn(text: &str) -> bool {
    let digits = digits_of(text);
    match digits.split_last() {
        Some((last, body)) if !body.is_empty() => luhn_check_digit(body) == *last,
        _ => false,
    }
}

/// Court case number in the CNJ layout (`NNNNNNN-DD.AAAA.J.TR.OOOO`).
pub fn lawsuit_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    layout(&digit_string(rng, 20), &[7, 2, 4, 1, 2], &["-", ".", ".", ".", "."])
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// Area code and nine-digit mobile line.
fn mobile_number<R: Rng + ?Sized>(rng: &mut R) -> (String, String) {
    let cell: String = CellNumber(PT_BR).fake_with_rng(rng);
    let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
    let (ddd, line) = digits.split_at_checked(2).unwrap_or(("", digits.as_str()));
    (ddd.to_owned(), line.to_owned())
}

/// Mobile phone in one of five layouts.
pub fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    let (ddd, line) = mobile_number(rng);
    match rng.random_range(0..5u8) {
        0 => format!("({ddd}) {}", layout(&line, &[5], &["-"])),
        1 => format!("{ddd} {line}"),
        2 => format!("+55{ddd}{line}"),
        3 => format!("+55 {ddd} {}", layout(&line, &[5], &[" "])),
        _ => line,
    }
}

/// Postal code in one of three layouts.
pub fn postcode<R: Rng + ?Sized>(rng: &mut R) -> String {
    let drawn: String = PostCode(PT_BR).fake_with_rng(rng);
    let base: String = drawn.chars().filter(char::is_ascii_digit).collect();
    let sep = pick(rng, &["-", "", " "]);
    layout(&base, &[5], &[sep])
}

/// Lower-case ASCII slug of a name, words joined by dots.
pub fn slugify(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".")
}

/// E-mail address derived from a person's name.
pub fn email_for<R: Rng + ?Sized>(rng: &mut R, name: &str) -> String {
    let suffix = rng.random_range(1..=999u32);
    format!("{}{suffix}@{}", slugify(name), pick(rng, &EMAIL_DOMAINS))
}

// ---------------------------------------------------------------------------
// Banking and network
// ---------------------------------------------------------------------------

/// Branch and account (`Ag: 1234-5 / CC: 123456-7`).
pub fn bank_account<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "Ag: {}-{} / CC: {}-{}",
        digit_string(rng, 4),
        digit_string(rng, 1),
        digit_string(rng, 6),
        digit_string(rng, 1)
    )
}

/// Pix key of a random kind (CPF, CNPJ, e-mail, phone or random EVP).
pub fn pix_key<R: Rng + ?Sized>(rng: &mut R, holder: &str) -> String {
    match rng.random_range(0..5u8) {
        0 => cpf(rng),
        1 => cnpj(rng),
        2 => email_for(rng, holder),
        3 => {
            let (ddd, line) = mobile_number(rng);
            format!("+55{ddd}{line}")
        }
        _ => uuid::Builder::from_random_bytes(rng.random())
            .into_uuid()
            .to_string(),
    }
}

/// Public-looking IPv4 address.
pub fn ipv4_public<R: Rng + ?Sized>(rng: &mut R) -> String {
    const RESERVED: [u8; 6] = [10, 100, 127, 169, 172, 192];
    let first = loop {
        let candidate = rng.random_range(1..=223u8);
        if !RESERVED.contains(&candidate) {
            break candidate;
        }
    };
    let [b, c, d]: [u8; 3] = rng.random();
    format!("{first}.{b}.{c}.{d}")
}

/// Colon-separated lower-case MAC address.
pub fn mac_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let drawn: String = MACAddress(PT_BR).fake_with_rng(rng);
    drawn.to_lowercase()
}

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Brazilian currency layout without symbol: `1.234.567,89`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect::<Vec<_>>()
        .join(".");
    let sign = if value.is_sign_negative() && value != 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped},{cents}")
}

/// Whole-real amount drawn from `range`, formatted with [`format_brl`].
pub fn brl_between<R: Rng + ?Sized>(rng: &mut R, range: std::ops::RangeInclusive<u32>) -> String {
    format_brl(f64::from(rng.random_range(range)))
}
