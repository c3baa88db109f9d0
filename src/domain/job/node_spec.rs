use serde::Serialize;

/// Request for `count` nodes of one kind, as written in `nodes=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSpec {
    pub count: u32,
    pub ppn: Option<u32>,
    pub gpus: Option<u32>,
    pub properties: Vec<String>,

    /// Set when the chunk names a node instead of a count. It may as well
    /// be a property; telling them apart needs the inventory.
    pub host: Option<String>,
}

/// Non-numeric `ppn=`/`gpus=` value found while splitting a node spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpecIssue {
    PpnNoNumber(String),
    GpusNoNumber(String),
}

impl NodeSpec {
    pub fn new(count: u32) -> Self {
        Self { count, ppn: None, gpus: None, properties: Vec::new(), host: None }
    }

    pub fn with_ppn(mut self, ppn: u32) -> Self {
        self.ppn = Some(ppn);
        self
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    /// Splits a `nodes=` value such as `2:ppn=4:ivybridge+1:ppn=20` into
    /// node specs.
    pub fn parse_all(value: &str) -> (Vec<NodeSpec>, Vec<NodeSpecIssue>) {
        let mut node_specs = Vec::new();
        let mut issues = Vec::new();

        for chunk in value.split('+') {
            let mut tokens = chunk.split(':');
            let head = tokens.next().unwrap_or_default();

            let mut node_spec = match parse_count(head) {
                Some(count) => NodeSpec::new(count),
                None => {
                    let mut node_spec = NodeSpec::new(1);
                    node_spec.host = Some(head.to_string());
                    node_spec
                }
            };

            for token in tokens {
                if let Some(ppn) = token.strip_prefix("ppn=") {
                    match parse_count(ppn) {
                        Some(ppn) => node_spec.ppn = Some(ppn),
                        None => issues.push(NodeSpecIssue::PpnNoNumber(ppn.to_string())),
                    }
                } else if let Some(gpus) = token.strip_prefix("gpus=") {
                    match parse_count(gpus) {
                        Some(gpus) => node_spec.gpus = Some(gpus),
                        None => issues.push(NodeSpecIssue::GpusNoNumber(gpus.to_string())),
                    }
                } else {
                    node_spec.properties.push(token.to_string());
                }
            }
            node_specs.push(node_spec);
        }

        (node_specs, issues)
    }
}

fn parse_count(token: &str) -> Option<u32> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) { token.parse().ok() } else { None }
}
