pub mod option_parser;
pub mod script_parser;

pub use option_parser::{OptionKind, OptionParser, ResourceKind, OPTION_TABLE, RESOURCE_TABLE};
pub use script_parser::{LineEnding, ParserState, ScriptParser};
