//! Questionnaire module taxonomy.
//!
//! Every survey variable code starts with the prefix of the questionnaire
//! module it belongs to (`C008` is in module C, `VDD004A` in VD).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SurveyModule {
    // Part 1: identification and control
    VD,
    // Part 2: household
    A,
    B,
    // Part 3: resident questionnaire
    C,
    D,
    E,
    F,
    G,
    I,
    J,
    K,
    L,
    // Part 4: selected resident questionnaire
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    U,
    Z,
    V,
    T,
    Y,
    H,
    W,
    X,
}

impl SurveyModule {
    pub const ALL: [SurveyModule; 27] = [
        SurveyModule::VD,
        SurveyModule::A,
        SurveyModule::B,
        SurveyModule::C,
        SurveyModule::D,
        SurveyModule::E,
        SurveyModule::F,
        SurveyModule::G,
        SurveyModule::I,
        SurveyModule::J,
        SurveyModule::K,
        SurveyModule::L,
        SurveyModule::M,
        SurveyModule::N,
        SurveyModule::O,
        SurveyModule::P,
        SurveyModule::Q,
        SurveyModule::R,
        SurveyModule::S,
        SurveyModule::U,
        SurveyModule::Z,
        SurveyModule::V,
        SurveyModule::T,
        SurveyModule::Y,
        SurveyModule::H,
        SurveyModule::W,
        SurveyModule::X,
    ];

    /// Variable-code prefix of the module.
    pub fn prefix(self) -> &'static str {
        match self {
            SurveyModule::VD => "VD",
            SurveyModule::A => "A",
            SurveyModule::B => "B",
            SurveyModule::C => "C",
            SurveyModule::D => "D",
            SurveyModule::E => "E",
            SurveyModule::F => "F",
            SurveyModule::G => "G",
            SurveyModule::I => "I",
            SurveyModule::J => "J",
            SurveyModule::K => "K",
            SurveyModule::L => "L",
            SurveyModule::M => "M",
            SurveyModule::N => "N",
            SurveyModule::O => "O",
            SurveyModule::P => "P",
            SurveyModule::Q => "Q",
            SurveyModule::R => "R",
            SurveyModule::S => "S",
            SurveyModule::U => "U",
            SurveyModule::Z => "Z",
            SurveyModule::V => "V",
            SurveyModule::T => "T",
            SurveyModule::Y => "Y",
            SurveyModule::H => "H",
            SurveyModule::W => "W",
            SurveyModule::X => "X",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SurveyModule::VD => "VARIÁVEIS DE AMOSTRAGEM",
            SurveyModule::A => "Informações do Domicílio",
            SurveyModule::B => {
                "Visitas domiciliares de Equipe de Saúde da Família e Agentes de Endemias"
            }
            SurveyModule::C => "Características gerais dos moradores",
            SurveyModule::D => "Características de educação dos moradores",
            SurveyModule::E => {
                "Características de trabalho das pessoas de 14 anos ou mais de idade"
            }
            SurveyModule::F => "Rendimentos de outras fontes",
            SurveyModule::G => "Pessoas com deficiências (Para pessoas de 2 anos ou mais de idade)",
            SurveyModule::I => "Cobertura de Plano de Saúde",
            SurveyModule::J => "Utilização de serviços de saúde",
            SurveyModule::K => "Saúde dos indivíduos com 60 anos ou mais",
            SurveyModule::L => "Crianças com menos de dois anos de idade",
            SurveyModule::M => "Características do trabalho e apoio social",
            SurveyModule::N => "Percepção do estado de saúde",
            SurveyModule::O => "Acidentes",
            SurveyModule::P => "Estilos de vida",
            SurveyModule::Q => "Doenças crônicas",
            SurveyModule::R => "Saúde da Mulher (Para mulheres de 15 anos ou mais de idade)",
            SurveyModule::S => {
                "Atendimento Pré-Natal (Para mulheres de 15 anos ou mais de idade)"
            }
            SurveyModule::U => "Saúde Bucal",
            SurveyModule::Z => {
                "Paternidade e Pré-natal do parceiro (Para homens de 15 anos ou mais)"
            }
            SurveyModule::V => "Violência (Para pessoas de 18 anos ou mais de idade)",
            SurveyModule::T => "Doenças transmissíveis",
            SurveyModule::Y => "Atividade sexual (Para pessoas de 18 anos ou mais de idade)",
            SurveyModule::H => "Atendimento médico (Para pessoas de 18 anos ou mais de idade)",
            SurveyModule::W => "ANTROPOMETRIA",
            SurveyModule::X => "",
        }
    }

    /// Whether a variable code belongs to this module (plain prefix match).
    ///
    /// `V` also matches `VD...` codes, the same as a `^V` pattern would.
    pub fn matches(self, code: &str) -> bool {
        code.starts_with(self.prefix())
    }
}

impl fmt::Display for SurveyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.prefix(), self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown survey module: {0}")]
pub struct UnknownModule(pub String);

impl FromStr for SurveyModule {
    type Err = UnknownModule;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        SurveyModule::ALL
            .into_iter()
            .find(|module| module.prefix().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownModule(value.to_string()))
    }
}
