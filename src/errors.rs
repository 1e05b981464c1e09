use std::path::PathBuf;

use error_chain::error_chain;

error_chain! {
    errors {
        NoDatabaseFound(path: PathBuf) {
            description("No database found")
            display("No database found at '{}'", path.display())
        }
        DatabaseAccessError(path: PathBuf) {
            description("Cannot open database")
            display("Cannot open database at '{}'", path.display())
        }
        QueryParsingError(query: String, position: usize) {
            description("Cannot parse query")
            display("Cannot parse query '{}' at position {}", &query, position)
        }
        StorageShapeError(query: String) {
            description("Expression is not valid for storage")
            display("'{}' is not valid for storage: only tags and 'and' are allowed", &query)
        }
        NotFound(what: String, name: String) {
            description("Not found")
            display("no such {} '{}'", what, name)
        }
        Conflict(what: String, name: String) {
            description("Conflict")
            display("a {} named '{}' already exists", what, name)
        }
        NotImplemented(what: String) {
            description("Not implemented")
            display("{} is not implemented", what)
        }
        InvalidArgument(message: String) {
            description("Invalid argument")
            display("{}", message)
        }
    }
    foreign_links {
        Io(std::io::Error);
        Rusqlite(rusqlite::Error);
        Regex(regex::Error);
        Json(serde_json::Error);
    }
}
