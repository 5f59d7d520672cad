//! Record builder for financial and payroll reports.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use rand::Rng;

use super::identifiers::{brl_between, digit_string, format_brl};
use super::people::{company, department, location, person};
use super::{days_after, days_before, format_date, SourceError};
use crate::record::DataRecord;

/// Analysis types keyed by the narrative key stored in `tipo_analise_chave`.
pub const TIPOS_ANALISE_FINANCEIRA: [(&str, &str); 12] = [
    ("folha_pagamento", "análise detalhada da folha de pagamento mensal"),
    ("custos_departamento", "levantamento de custos por departamento/centro de custo"),
    ("beneficios_colaborador", "relatório de benefícios e vantagens por colaborador"),
    ("provisoes_trabalhistas", "cálculo de provisões trabalhistas e encargos"),
    ("budget_anual", "elaboração do budget anual de pessoas"),
    ("turnover_custos", "análise de custos de turnover e reposição"),
    ("horas_extras", "relatório de horas extras e seus impactos financeiros"),
    ("absenteismo_financeiro", "impacto financeiro do absenteísmo na operação"),
    ("terceirizacao_vs_clt", "análise comparativa de custos entre terceirização e CLT"),
    ("reajuste_salarial", "estudo de impacto de reajustes salariais"),
    ("rescisoes_custos", "levantamento de custos com rescisões e demissões"),
    ("plr_bonus", "cálculo e distribuição de PLR/bônus variáveis"),
];

const BANCOS_BRASILEIROS: [&str; 10] = [
    "Banco do Brasil",
    "Bradesco",
    "Itaú Unibanco",
    "Santander Brasil",
    "Caixa Econômica Federal",
    "Banco BTG Pactual",
    "Banco Safra",
    "Banco Votorantim",
    "Banco Original",
    "Nubank",
];

const CARGOS_FINANCEIROS: [&str; 3] = ["Controller", "Analista Financeiro Sr", "Gerente Financeiro"];
const CARGOS_GESTAO: [&str; 3] = ["Gerente de RH", "Diretor de Pessoas", "Coordenador de Folha"];
const CARGOS_OPERACIONAIS: [&str; 3] = ["Analista de Folha", "Assistente Financeiro", "Auxiliar de DP"];

/// Currency amounts (whole reais) and their ranges.
const CURRENCY_FIELDS: [(&str, RangeInclusive<u32>); 42] = [
    ("valor_folha_total", 150_000..=800_000),
    ("valor_salarios", 100_000..=500_000),
    ("valor_beneficios", 20_000..=80_000),
    ("valor_encargos", 30_000..=150_000),
    ("salario_individual", 8_000..=25_000),
    ("custo_departamento", 50_000..=200_000),
    ("budget_total", 2_000_000..=10_000_000),
    ("valor_centro_custo_1", 80_000..=300_000),
    ("valor_centro_custo_2", 60_000..=250_000),
    ("desembolso_mensal", 150_000..=800_000),
    ("reserva_caixa_folha", 300_000..=2_000_000),
    ("valor_terceirizados", 30_000..=120_000),
    ("ajuste_orcamentario", 50_000..=200_000),
    ("valor_beneficios_total", 3_000..=12_000),
    ("valor_provisoes_total", 80_000..=300_000),
    ("valor_ferias", 25_000..=100_000),
    ("valor_13_salario", 20_000..=80_000),
    ("valor_fgts", 15_000..=60_000),
    ("valor_inss", 20_000..=80_000),
    ("provisao_individual", 5_000..=20_000),
    ("salario_atual", 4_000..=15_000),
    ("orcamento_departamento", 200_000..=800_000),
    ("reserva_contingencia", 100_000..=500_000),
    ("valor_horas_extras", 15_000..=60_000),
    ("valor_hora_media", 25..=80),
    ("custo_medio_colaborador", 8_000..=25_000),
    ("custo_turnover", 15_000..=50_000),
    ("produtividade_colaborador", 50_000..=200_000),
    ("projecao_12_meses", 1_800_000..=9_600_000),
    ("impacto_dissidio", 100_000..=500_000),
    ("economia_otimista", 50_000..=300_000),
    ("custo_novas_contratacoes", 200_000..=800_000),
    ("carga_tributaria_total", 60_000..=300_000),
    ("contribuicao_inss_patronal", 30_000..=120_000),
    ("contribuicao_fgts", 12_000..=50_000),
    ("contribuicao_sistema_s", 8_000..=30_000),
    ("economia_tributaria", 25_000..=100_000),
    ("exposicao_trabalhista", 500_000..=2_000_000),
    ("valor_contingenciamento", 200_000..=800_000),
    ("cobertura_seguro_executivos", 5_000_000..=20_000_000),
    ("economia_sistema_ponto", 50_000..=200_000),
    ("custo_substituicao_critica", 80_000..=300_000),
];

/// One-decimal percentages and their ranges.
const PERCENT_FIELDS: [(&str, f64, f64); 17] = [
    ("percentual_variacao", -5.0, 15.0),
    ("percentual_terceirizados", 10.0, 35.0),
    ("percentual_receita_liquida", 25.0, 45.0),
    ("percentual_orcamento_dept", 15.0, 35.0),
    ("percentual_mercado", 5.0, 25.0),
    ("percentual_impacto_orcamento", 2.0, 8.0),
    ("percentual_horas_departamento", 20.0, 60.0),
    ("percentual_carga_tributaria", 35.0, 45.0),
    ("percentual_reducao_beneficios", 5.0, 15.0),
    ("variacao_custo_medio", 2.0, 12.0),
    ("margem_contribuicao", 15.0, 35.0),
    ("roi_beneficios", 15.0, 35.0),
    ("posicionamento_salarial", 5.0, 25.0),
    ("competitividade_beneficios", 80.0, 120.0),
    ("superacao_produtividade", 5.0, 20.0),
    ("inflacao_projetada", 3.5, 8.0),
    ("crescimento_headcount", 5.0, 20.0),
];

/// Integer counts and their ranges.
const COUNT_FIELDS: [(&str, RangeInclusive<i64>); 7] = [
    ("qtd_colaboradores", 15..=150),
    ("total_horas_extras", 200..=1_500),
    ("horas_individuais", 20..=80),
    ("tempo_casa", 1..=15),
    ("meses_reserva_caixa", 2..=6),
    ("numero_contratacoes", 5..=50),
    ("reducao_tempo_fechamento", 1..=5),
];

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Monetary values, percentages and counts used by the financial bank.
pub fn financial_values<R: Rng + ?Sized>(rng: &mut R) -> DataRecord {
    let mut values = DataRecord::new();
    for (key, range) in CURRENCY_FIELDS {
        values.insert(key, brl_between(rng, range));
    }
    for (key, low, high) in PERCENT_FIELDS {
        values.insert(key, round_tenths(rng.random_range(low..=high)));
    }
    for (key, range) in COUNT_FIELDS {
        values.insert(key, rng.random_range(range));
    }
    values.insert("roi_treinamento", format_brl(rng.random_range(2.5..=8.0)));
    values.insert(
        "centro_custo_1",
        format!("CC{}", rng.random_range(1000..=9999u32)),
    );
    values.insert(
        "centro_custo_2",
        format!("CC{}", rng.random_range(1000..=9999u32)),
    );
    values.insert("conta_bancaria_empresa", digit_string(rng, 8));
    values.insert("conta_provisoes", digit_string(rng, 8));
    values
}

/// Reporting-period and planning dates relative to `today`.
///
/// # Errors
///
/// Returns [`SourceError::DateOutOfRange`] near the calendar limits.
pub fn financial_dates(today: NaiveDate) -> Result<DataRecord, SourceError> {
    Ok(DataRecord::new()
        .with("data_inicio", format_date(days_before(today, 90)?))
        .with("data_fim", format_date(days_before(today, 1)?))
        .with("data_aprovacao_budget", format_date(days_before(today, 180)?))
        .with("data_vigencia_dissidio", format_date(days_after(today, 30)?))
        .with("data_validacao", format_date(days_before(today, 2)?))
        .with("data_recomendacao", format_date(days_after(today, 60)?))
        .with("ano_proximo", i64::from(today.year()).saturating_add(1)))
}

/// Filing and system metadata.
pub fn financial_metadata<R: Rng + ?Sized>(rng: &mut R) -> DataRecord {
    DataRecord::new()
        .with(
            "protocolo_arquivo",
            format!("PROT{}", rng.random_range(100_000..=999_999u32)),
        )
        .with(
            "usuario_sistema",
            format!("usr{}", rng.random_range(1000..=9999u32)),
        )
        .with(
            "numero_apolice",
            format!(
                "{}-{}",
                rng.random_range(100_000..=999_999u32),
                rng.random_range(10..=99u32)
            ),
        )
}

/// Build the data record for one financial report.
///
/// # Errors
///
/// Returns [`SourceError::DateOutOfRange`] near the calendar limits.
pub fn build<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Result<DataRecord, SourceError> {
    let mixed_roles: Vec<&str> = CARGOS_OPERACIONAIS
        .iter()
        .chain(&CARGOS_GESTAO)
        .copied()
        .collect();
    let (tipo_chave, tipo_descritivo) =
        TIPOS_ANALISE_FINANCEIRA[rng.random_range(0..TIPOS_ANALISE_FINANCEIRA.len())];

    let mut record = DataRecord::new()
        .with("funcionario", person(rng, &mixed_roles))
        .with("funcionario_destaque", person(rng, &CARGOS_GESTAO))
        .with("funcionario_horas_extras", person(rng, &CARGOS_OPERACIONAIS))
        .with("controller", person(rng, &CARGOS_FINANCEIROS))
        .with("gestor_departamento", person(rng, &CARGOS_GESTAO))
        .with("contador", person(rng, &["Contador"]))
        .with("gerente_banco", person(rng, &["Gerente de Relacionamento"]))
        .with("empresa_contabilidade", company(rng, &["Contador", "Auditor"]))
        .with("consultoria", company(rng, &["Consultor Senior"]))
        .with("fornecedor", company(rng, &["Gerente Comercial"]))
        .with("operadora_saude", company(rng, &["Analista de Benefícios"]))
        .with("escritorio_advocacia", company(rng, &["Advogado Sênior"]))
        .with("banco_principal", location(rng, &BANCOS_BRASILEIROS))
        .with("departamento", department(rng))
        .with("tipo_analise_chave", tipo_chave)
        .with("tipo_analise_descritivo", tipo_descritivo);

    record.extend(financial_values(rng));
    record.extend(super::suspensao::incident_dates(rng, today)?);
    record.extend(financial_dates(today)?);
    record.extend(financial_metadata(rng));
    Ok(record)
}
