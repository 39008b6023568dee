use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Language level of the emitted code
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum, Serialize, Deserialize, JsonSchema)]
pub enum EsTarget {
    #[value(name = "es3", alias = "ES3")]
    #[serde(rename = "ES3", alias = "es3")]
    Es3,

    #[value(name = "es5", alias = "ES5")]
    #[serde(rename = "ES5", alias = "es5")]
    Es5,
}

/// Module system of the emitted code
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    /// Synchronous `require` modules
    #[value(name = "commonjs")]
    CommonJs,

    /// Asynchronous modules; cannot be concatenated into one file
    #[value(name = "amd")]
    Amd,
}

impl From<EsTarget> for typeplan::Target {
    fn from(target: EsTarget) -> Self {
        match target {
            EsTarget::Es3 => typeplan::Target::Es3,
            EsTarget::Es5 => typeplan::Target::Es5,
        }
    }
}

impl From<Module> for typeplan::ModuleKind {
    fn from(module: Module) -> Self {
        match module {
            Module::CommonJs => typeplan::ModuleKind::CommonJs,
            Module::Amd => typeplan::ModuleKind::Amd,
        }
    }
}
