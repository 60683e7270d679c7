//! Sample R sources shared by the integration tests

/// `plot` sits on line 10, column 1
pub const GRAPHICS_R: &str = "# Plotting helpers

setup <- function() {
  invisible(NULL)
}




plot <- function(x, ...) {
  UseMethod(\"plot\")
}
";

/// `plotMatrix` sits on line 4, column 3
pub const UTIL_R: &str = "library(stats)

# Matrix helpers
  plotMatrix <- function(m) {
  image(m)
}
";

pub const NESTED_R: &str = "outer <- function(data) {
  inner <- function(row) {
    row * 2
  }
  lapply(data, inner)
}
";

pub const NO_DEFINITIONS_R: &str = "x <- 1
y <- c(1, 2, 3)
print(mean(y))
";

/// `(name, context, line, column)` for compact assertions
pub fn summarize(records: &[codesearch::DefinitionRecord]) -> Vec<(String, String, u32, u32)> {
    records
        .iter()
        .map(|r| (r.name.clone(), r.context.clone(), r.line, r.column))
        .collect()
}
