//! Record builder for disciplinary suspension notices.

use chrono::NaiveDate;
use rand::Rng;

use super::people::{company, location, person};
use super::{days_after, days_before, format_date, SourceError};
use crate::record::DataRecord;

/// Disciplinary reasons keyed by the narrative key stored in `motivo_chave`.
pub const MOTIVOS_DISCIPLINARES: [(&str, &str); 21] = [
    ("atestado_suspeito", "apresentação de um atestado médico com suspeita de fraude"),
    ("insubordinacao", "insubordinação direta a um superior"),
    ("atraso_reiterado", "reiterados atrasos sem justificativa"),
    ("conduta_inadequada", "conduta inadequada em ambiente corporativo"),
    ("uso_incorreto_recursos", "uso indevido de recursos da empresa para fins pessoais"),
    ("assedio", "comportamento caracterizado como assédio moral contra colegas"),
    ("embriaguez", "comparecimento ao trabalho sob efeito de álcool"),
    ("negligencia", "negligência no cumprimento de atividades críticas"),
    ("conflito_interno", "conflito aberto com outro colaborador em ambiente de trabalho"),
    ("quebra_sigilo", "quebra de sigilo de informações estratégicas da empresa"),
    ("desrespeito_politicas", "desrespeito às políticas internas da empresa"),
    ("falta_repetida", "faltas recorrentes sem justificativa formal"),
    ("divulgacao_informacoes", "divulgação não autorizada de informações confidenciais"),
    ("associacao_inadequada", "associação com atividades externas que geram conflito de interesse"),
    ("uso_mau_conduta_digital", "uso inadequado de recursos digitais e redes corporativas"),
    ("insatisfacao_clientes", "comportamento que resultou em reclamações graves de clientes"),
    ("furtos", "apropriação indevida de bens da empresa"),
    ("violencia", "atos de violência ou ameaça contra colegas ou superiores"),
    ("discriminacao", "comportamento discriminatório com base em raça, gênero ou orientação sexual"),
    ("violar_normas_seguranca", "descumprimento de normas de segurança do trabalho"),
    ("comportamento_abusivo", "atos de abuso verbal ou físico no ambiente corporativo"),
];

const HOSPITAIS: [&str; 10] = [
    "Hospital Central de Simões Filho",
    "Clínica Integrada da Bahia",
    "Hospital Esperança",
    "UPA de Camaçari",
    "Hospital Municipal de Lauro de Freitas",
    "Clínica São Lucas",
    "Hospital Regional de Santo Antônio de Jesus",
    "UPA de Feira de Santana",
    "Hospital de Urgência e Emergência de Salvador",
    "Clínica Vida Plena",
];

const ORGAOS_PUBLICOS: [&str; 9] = [
    "Prefeitura de Salvador",
    "Ministério do Trabalho e Emprego",
    "Secretaria Estadual de Saúde da Bahia",
    "Tribunal de Contas do Estado da Bahia",
    "Ministério da Educação",
    "Secretaria Municipal de Segurança Pública",
    "Prefeitura de Camaçari",
    "Instituto Nacional do Seguro Social (INSS)",
    "Secretaria de Assistência Social do Estado da Bahia",
];

const CARGOS_BASE: [&str; 3] = [
    "Analista de Sistemas",
    "Assistente Administrativo",
    "Técnico de Suporte",
];
const CARGOS_GESTAO: [&str; 2] = ["Gerente de Projetos", "Coordenador de Operações"];
const CARGOS_APOIO: [&str; 6] = [
    "Analista Jr",
    "Estagiário",
    "Analista de RH Sênior",
    "Advogado Corporativo",
    "Auditor Externo",
    "Consultor",
];

const DIAS_SUSPENSAO: [i64; 4] = [1, 3, 5, 10];

/// Incident, report and prior-warning dates relative to `today`.
///
/// The incident is 10 to 20 days back, the report two days after it, and the
/// earlier warning 60 to 180 days before the incident.
pub fn incident_dates<R: Rng + ?Sized>(
    rng: &mut R,
    today: NaiveDate,
) -> Result<DataRecord, SourceError> {
    let incident = days_before(today, rng.random_range(10..=20))?;
    let report = days_after(incident, 2)?;
    let warning = days_before(incident, rng.random_range(60..=180))?;
    Ok(DataRecord::new()
        .with("data_incidente", format_date(incident))
        .with("data_relatorio", format_date(report))
        .with("data_advertencia", format_date(warning)))
}

/// Build the data record for one suspension notice.
///
/// # Errors
///
/// Returns [`SourceError::DateOutOfRange`] if the reference date is too close
/// to the calendar limits.
pub fn build<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Result<DataRecord, SourceError> {
    let all_roles: Vec<&str> = CARGOS_BASE
        .iter()
        .chain(&CARGOS_GESTAO)
        .chain(&CARGOS_APOIO)
        .copied()
        .collect();

    let (motivo_chave, motivo_descritivo) =
        MOTIVOS_DISCIPLINARES[rng.random_range(0..MOTIVOS_DISCIPLINARES.len())];
    let dias = DIAS_SUSPENSAO[rng.random_range(0..DIAS_SUSPENSAO.len())];

    let mut record = DataRecord::new()
        .with("funcionario", person(rng, &CARGOS_BASE))
        .with("supervisor", person(rng, &CARGOS_GESTAO))
        .with("testemunha", person(rng, &CARGOS_APOIO))
        .with("rh_responsavel", person(rng, &["Analista de RH Sênior"]))
        .with("advogado_interno", person(rng, &["Advogado Corporativo"]))
        .with("auditor_externo", person(rng, &["Auditor Externo", "Consultor"]))
        .with("cliente", company(rng, &all_roles))
        .with("hospital", location(rng, &HOSPITAIS))
        .with("org_publica", location(rng, &ORGAOS_PUBLICOS))
        .with("motivo_chave", motivo_chave)
        .with("motivo_descritivo", motivo_descritivo)
        .with("dias_suspensao", dias);
    record.extend(incident_dates(rng, today)?);
    Ok(record)
}
