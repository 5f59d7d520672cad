//! Person, company, location and department entities.

use fake::faker::address::raw::{CityName, StateAbbr, StreetName};
use fake::faker::company::raw::{Buzzword, CompanyName};
use fake::faker::name::raw::Name;
use fake::locales::PT_BR;
use fake::Fake;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::identifiers;
use crate::record::{DataRecord, Field};

const DEPARTMENTS: [&str; 8] = [
    "Tecnologia da Informação",
    "Recursos Humanos",
    "Financeiro",
    "Comercial",
    "Operações",
    "Marketing",
    "Jurídico",
    "Logística",
];

/// Pick one entry, or `""` for an empty slice.
pub fn choose<'a, R: Rng + ?Sized>(rng: &mut R, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// Full pt-BR name.
pub fn full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    Name(PT_BR).fake_with_rng(rng)
}

/// City name.
pub fn city<R: Rng + ?Sized>(rng: &mut R) -> String {
    CityName(PT_BR).fake_with_rng(rng)
}

/// Two-letter state abbreviation.
pub fn state<R: Rng + ?Sized>(rng: &mut R) -> String {
    StateAbbr(PT_BR).fake_with_rng(rng)
}

/// `"City - UF"`.
pub fn city_state<R: Rng + ?Sized>(rng: &mut R) -> String {
    let city = city(rng);
    format!("{city} - {}", state(rng))
}

/// Street and number.
pub fn street_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let street: String = StreetName(PT_BR).fake_with_rng(rng);
    format!("{street}, {}", rng.random_range(1..=2999u32))
}

/// Full postal address: `Street, 123, City - UF, CEP 12345-678`.
pub fn full_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let street = street_address(rng);
    let place = city_state(rng);
    format!("{street}, {place}, CEP {}", identifiers::postcode(rng))
}

/// Person with documents, professional and financial sub-records.
///
/// `roles` biases `profissional.cargo`; an empty slice leaves it blank.
/// About 10% of people carry an OAB number and half a credit card; the rest
/// hold explicit nulls there.
pub fn person<R: Rng + ?Sized>(rng: &mut R, roles: &[&str]) -> DataRecord {
    let name = full_name(rng);
    let email = identifiers::email_for(rng, &name);
    let phone = identifiers::phone(rng);

    let documentos = DataRecord::new()
        .with("cpf", identifiers::cpf(rng))
        .with("rg", identifiers::rg(rng))
        .with("cnh", identifiers::cnh(rng));

    let oab = rng.random_bool(0.1).then(|| identifiers::oab(rng));
    let profissional = DataRecord::new()
        .with("matricula", rng.random_range(10_000..=99_999i64))
        .with("cargo", choose(rng, roles))
        .with("oab", Field::from(oab));

    let card = rng.random_bool(0.5).then(|| identifiers::credit_card(rng));
    let financeiro = DataRecord::new().with("cartao_de_credito", Field::from(card));

    DataRecord::new()
        .with("nome", name)
        .with("email", email)
        .with("telefone", phone)
        .with("documentos", documentos)
        .with("profissional", profissional)
        .with("financeiro", financeiro)
}

/// Company with contact, banking, legal and network sub-records.
pub fn company<R: Rng + ?Sized>(rng: &mut R, contact_roles: &[&str]) -> DataRecord {
    let razao_social: String = CompanyName(PT_BR).fake_with_rng(rng);
    let first_word = razao_social
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_owned();
    let buzz: String = Buzzword(PT_BR).fake_with_rng(rng);
    let nome_fantasia = format!("{first_word} {}", title_case(&buzz));

    let contact_name = full_name(rng);
    let contato = DataRecord::new()
        .with("nome", contact_name.as_str())
        .with("cargo", choose(rng, contact_roles))
        .with("email", identifiers::email_for(rng, &contact_name))
        .with("telefone_comercial", identifiers::phone(rng));

    let financeiro = DataRecord::new()
        .with("conta_bancaria", identifiers::bank_account(rng))
        .with("chave_pix", identifiers::pix_key(rng, &razao_social));

    let processo = if rng.random_bool(0.2) {
        identifiers::lawsuit_number(rng)
    } else {
        "N/A".to_owned()
    };

    let rede = DataRecord::new()
        .with("ip_servidor_principal", identifiers::ipv4_public(rng))
        .with("mac_address_gateway", identifiers::mac_address(rng));

    DataRecord::new()
        .with("razao_social", razao_social)
        .with("nome_fantasia", nome_fantasia)
        .with("cnpj", identifiers::cnpj(rng))
        .with("endereco_fiscal", full_address(rng))
        .with("contato_principal", contato)
        .with("financeiro", financeiro)
        .with("juridico", DataRecord::new().with("processo_judicial", processo))
        .with("rede", rede)
}

/// Named place (hospital, agency, bank branch) picked from `names`.
pub fn location<R: Rng + ?Sized>(rng: &mut R, names: &[&str]) -> DataRecord {
    DataRecord::new()
        .with("nome", choose(rng, names))
        .with("cnpj", identifiers::cnpj(rng))
        .with("endereco", full_address(rng))
        .with("telefone", identifiers::phone(rng))
}

/// Internal department with code and cost centre.
pub fn department<R: Rng + ?Sized>(rng: &mut R) -> DataRecord {
    DataRecord::new()
        .with("nome", choose(rng, &DEPARTMENTS))
        .with("codigo", format!("DEPT{}", rng.random_range(100..=999u32)))
        .with(
            "centro_custo",
            rng.random_range(1000..=9999u32).to_string(),
        )
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
