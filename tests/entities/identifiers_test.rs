//! Check digits and layouts of generated identifiers.

use papelada::entities::identifiers::{
    cnpj, cpf, credit_card, format_brl, is_valid_cnpj, is_valid_cpf, is_valid_luhn, mac_address,
    phone, postcode, slugify,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn digits(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

#[test]
fn generated_cpfs_validate_in_every_layout() {
    let mut rng = StdRng::seed_from_u64(10);
    for _ in 0..500 {
        let value = cpf(&mut rng);
        assert_eq!(digits(&value), 11, "{value}");
        assert!(is_valid_cpf(&value), "{value}");
    }
}

#[test]
fn generated_cnpjs_validate() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..500 {
        let value = cnpj(&mut rng);
        assert_eq!(digits(&value), 14, "{value}");
        assert!(is_valid_cnpj(&value), "{value}");
    }
}

#[test]
fn generated_cards_pass_luhn() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..500 {
        let value = credit_card(&mut rng);
        assert!((13..=16).contains(&digits(&value)), "{value}");
        assert!(is_valid_luhn(&value), "{value}");
    }
}

#[test]
fn tampered_documents_fail_validation() {
    assert!(!is_valid_cpf("123"));
    assert!(!is_valid_cpf("529.982.247-52"));
    assert!(!is_valid_cnpj("11.222.333/0001-18"));
    assert!(!is_valid_luhn("4111 1111 1111 1112"));
    assert!(!is_valid_luhn("7"));
}

#[test]
fn phones_and_postcodes_have_expected_digit_counts() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..200 {
        let number = phone(&mut rng);
        let count = digits(&number);
        assert!(count == 9 || count == 11 || count == 13, "{number}");
        assert_eq!(digits(&postcode(&mut rng)), 8);
    }
}

#[test]
fn card_issuers_vary() {
    let mut rng = StdRng::seed_from_u64(14);
    let leads: std::collections::HashSet<char> = (0..200)
        .filter_map(|_| credit_card(&mut rng).chars().next())
        .collect();
    assert!(leads.contains(&'3') && leads.contains(&'4') && leads.contains(&'5'));
}

#[test]
fn mac_addresses_are_lower_case_hex_pairs() {
    let mut rng = StdRng::seed_from_u64(15);
    for _ in 0..50 {
        let mac = mac_address(&mut rng);
        let pairs: Vec<&str> = mac.split(':').collect();
        assert_eq!(pairs.len(), 6, "{mac}");
        assert!(pairs
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    }
}

#[test]
fn brl_amounts_use_brazilian_separators() {
    assert_eq!(format_brl(0.0), "0,00");
    assert_eq!(format_brl(999.5), "999,50");
    assert_eq!(format_brl(1_234.56), "1.234,56");
    assert_eq!(format_brl(1_234_567.0), "1.234.567,00");
    assert_eq!(format_brl(-42.1), "-42,10");
}

#[test]
fn slugs_are_ascii_and_dotted() {
    assert_eq!(slugify("José da Conceição"), "jose.da.conceicao");
    assert_eq!(slugify("  Ana  Lúcia "), "ana.lucia");
}
