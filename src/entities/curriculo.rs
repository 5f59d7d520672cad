//! Record builder for résumé analyses.

use rand::Rng;

use super::people::{choose, city_state, company, person};
use crate::record::DataRecord;

/// Practice areas keyed by short code.
pub const AREAS_ATUACAO: [(&str, &str); 10] = [
    ("tecnologia", "Desenvolvimento de software e soluções tecnológicas"),
    ("marketing", "Marketing digital e estratégias de comunicação"),
    ("vendas", "Vendas corporativas e relacionamento com clientes"),
    ("financeiro", "Controladoria e análises financeiras"),
    ("operacoes", "Gestão operacional e processos internos"),
    ("juridico", "Assessoria jurídica e compliance corporativo"),
    ("rh", "Gestão de pessoas e desenvolvimento organizacional"),
    ("logistica", "Supply chain e logística de distribuição"),
    ("qualidade", "Gestão da qualidade e melhoria contínua"),
    ("projetos", "Gerenciamento de projetos estratégicos"),
];

const UNIVERSIDADES: [&str; 10] = [
    "Universidade Federal da Bahia (UFBA)",
    "Universidade Católica do Salvador (UCSAL)",
    "Universidade Salvador (UNIFACS)",
    "Instituto Federal da Bahia (IFBA)",
    "Faculdade Ruy Barbosa (FRB)",
    "Universidade Estadual de Feira de Santana (UEFS)",
    "Centro Universitário FTC",
    "Faculdade de Tecnologia e Ciências (FTC)",
    "Universidade do Estado da Bahia (UNEB)",
    "Faculdade Maurício de Nassau",
];

const CERTIFICACOES: [&str; 10] = [
    "Project Management Professional (PMP)",
    "Certified Scrum Master (CSM)",
    "AWS Certified Solutions Architect",
    "Google Analytics Certified",
    "Salesforce Administrator",
    "ITIL Foundation Certificate",
    "Six Sigma Green Belt",
    "Microsoft Azure Fundamentals",
    "Cisco Certified Network Associate (CCNA)",
    "Oracle Database Administrator Certified",
];

const CARGOS_TECH: [&str; 4] = [
    "Desenvolvedor Full Stack",
    "Arquiteto de Software",
    "DevOps Engineer",
    "Data Scientist",
];
const CARGOS_GESTAO: [&str; 3] = [
    "Gerente de Projetos",
    "Coordenador de Equipe",
    "Supervisor de Operações",
];
const CARGOS_COMERCIAL: [&str; 3] = ["Analista Comercial", "Consultor de Vendas", "Account Manager"];
const CARGOS_APOIO: [&str; 3] = ["Analista Jr", "Especialista", "Coordenador"];

const CURSOS: [&str; 7] = [
    "Engenharia de Software",
    "Administração",
    "Economia",
    "Marketing",
    "Direito",
    "Psicologia",
    "Engenharia de Produção",
];
const POS_GRADUACOES: [&str; 4] = [
    "MBA em Gestão Estratégica",
    "Especialização em Digital Business",
    "Mestrado em Administração",
    "Pós em Data Science",
];
const COMPETENCIAS: [&str; 5] = [
    "Python e Machine Learning",
    "React e Node.js",
    "SAP e ERP",
    "Google Ads e Analytics",
    "Power BI e Excel Avançado",
];

/// Target position drawn from the roles that fit `area`.
fn target_role<R: Rng + ?Sized>(rng: &mut R, area: &str) -> String {
    match area {
        "tecnologia" => choose(rng, &CARGOS_TECH).to_owned(),
        "vendas" | "marketing" => choose(rng, &CARGOS_COMERCIAL).to_owned(),
        _ => {
            let pool: Vec<&str> = CARGOS_GESTAO.iter().chain(&CARGOS_APOIO).copied().collect();
            choose(rng, &pool).to_owned()
        }
    }
}

/// Build the data record for one résumé analysis.
pub fn build<R: Rng + ?Sized>(rng: &mut R) -> DataRecord {
    let (area_key, area_label) = AREAS_ATUACAO[rng.random_range(0..AREAS_ATUACAO.len())];

    let mut candidato = person(rng, &CARGOS_APOIO);
    candidato.insert("endereco", city_state(rng));

    let previous_roles: Vec<&str> = CARGOS_GESTAO.iter().chain(&CARGOS_TECH).copied().collect();

    DataRecord::new()
        .with("candidato", candidato)
        .with("empresa_anterior", company(rng, &CARGOS_GESTAO))
        .with("referencia", person(rng, &CARGOS_GESTAO))
        .with(
            "universidade",
            DataRecord::new().with("nome", choose(rng, &UNIVERSIDADES)),
        )
        .with("vaga_pretendida", target_role(rng, area_key))
        .with("area_principal", area_label)
        .with("anos_experiencia", rng.random_range(2..=15i64))
        .with("curso_superior", choose(rng, &CURSOS))
        .with("pos_graduacao", choose(rng, &POS_GRADUACOES))
        .with("certificacao_principal", choose(rng, &CERTIFICACOES))
        .with("competencia_tecnica", choose(rng, &COMPETENCIAS))
        .with(
            "ferramenta_especifica",
            choose(rng, &["Salesforce", "Tableau", "Jenkins", "Docker", "Kubernetes"]),
        )
        .with(
            "metodologia_trabalho",
            choose(rng, &["Scrum", "Kanban", "Design Thinking"]),
        )
        .with(
            "area_especializacao",
            choose(
                rng,
                &["Inteligência Artificial", "Marketing Digital", "Finanças Corporativas"],
            ),
        )
        .with("cargo_anterior", choose(rng, &previous_roles))
        .with("tamanho_equipe", rng.random_range(3..=20i64))
        .with("valor_economia", format!("{}.000", rng.random_range(50..=500u32)))
        .with("percentual_melhoria", rng.random_range(15..=80i64))
        .with(
            "area_inovacao",
            choose(rng, &["automação de processos", "experiência do cliente"]),
        )
        .with("percentual_crescimento", rng.random_range(10..=150i64))
        .with("meses_gap", rng.random_range(2..=8i64))
        .with(
            "tecnologia_faltante",
            choose(rng, &["Kubernetes", "Machine Learning", "Blockchain"]),
        )
        .with("salario_pretendido", format!("{}.000", rng.random_range(8..=25u32)))
        .with("situacao_salario", choose(rng, &["acima", "dentro", "abaixo"]))
        .with("prazo_inicio", rng.random_range(15..=60i64))
        .with("valor_investimento", format!("{}.000", rng.random_range(5..=50u32)))
}
