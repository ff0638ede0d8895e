use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryInput {
    #[serde(default)]
    pub query: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ByNamesInput {
    pub names: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionInput {
    pub drug1: String,
    pub drug2: String,
}
