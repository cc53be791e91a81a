use std::collections::HashMap;

/// Extension-to-language lookup used for root-directory code-type detection.
///
/// Immutable by construction; the collector receives a map built from this
/// table at creation time rather than consulting process-wide state.
pub const LANGUAGE_BY_EXTENSION: &[(&str, &str)] = &[
    (".py", "Python"),
    (".js", "JavaScript"),
    (".ts", "TypeScript"),
    (".jsx", "React"),
    (".tsx", "React"),
    (".java", "Java"),
    (".kt", "Kotlin"),
    (".scala", "Scala"),
    (".go", "Go"),
    (".rs", "Rust"),
    (".cpp", "C++"),
    (".cc", "C++"),
    (".cxx", "C++"),
    (".c", "C"),
    (".h", "C/C++"),
    (".hpp", "C++"),
    (".cs", "C#"),
    (".php", "PHP"),
    (".rb", "Ruby"),
    (".swift", "Swift"),
    (".m", "Objective-C"),
    (".mm", "Objective-C++"),
    (".r", "R"),
    (".pl", "Perl"),
    (".pm", "Perl"),
    (".sh", "Shell"),
    (".bash", "Shell"),
    (".zsh", "Shell"),
    (".fish", "Shell"),
    (".ps1", "PowerShell"),
    (".psm1", "PowerShell"),
    (".tf", "Terraform"),
    (".hcl", "HCL"),
    (".yml", "YAML"),
    (".yaml", "YAML"),
    (".json", "JSON"),
    (".xml", "XML"),
    (".html", "HTML"),
    (".htm", "HTML"),
    (".css", "CSS"),
    (".scss", "SCSS"),
    (".sass", "SASS"),
    (".less", "LESS"),
    (".vue", "Vue.js"),
    (".svelte", "Svelte"),
    (".dart", "Dart"),
    (".lua", "Lua"),
    (".sql", "SQL"),
    (".md", "Markdown"),
    (".rst", "reStructuredText"),
    (".tex", "LaTeX"),
    (".ipynb", "Jupyter"),
    (".proto", "Protocol Buffers"),
    (".graphql", "GraphQL"),
    (".gql", "GraphQL"),
    (".clj", "Clojure"),
    (".cljs", "ClojureScript"),
    (".ex", "Elixir"),
    (".exs", "Elixir"),
    (".erl", "Erlang"),
    (".hrl", "Erlang"),
    (".elm", "Elm"),
    (".hs", "Haskell"),
    (".lhs", "Haskell"),
    (".ml", "OCaml"),
    (".mli", "OCaml"),
    (".fs", "F#"),
    (".fsx", "F#"),
    (".fsi", "F#"),
    (".nim", "Nim"),
    (".nims", "Nim"),
    (".cr", "Crystal"),
    (".d", "D"),
    (".zig", "Zig"),
    (".jl", "Julia"),
    (".pas", "Pascal"),
    (".pp", "Pascal"),
    (".ada", "Ada"),
    (".adb", "Ada"),
    (".ads", "Ada"),
    (".cob", "COBOL"),
    (".cbl", "COBOL"),
    (".for", "Fortran"),
    (".f90", "Fortran"),
    (".f95", "Fortran"),
    (".f03", "Fortran"),
    (".f08", "Fortran"),
    (".dockerfile", "Docker"),
    (".dockerignore", "Docker"),
    (".gitignore", "Git"),
    (".gitattributes", "Git"),
];

pub fn language_map() -> HashMap<&'static str, &'static str> {
    LANGUAGE_BY_EXTENSION.iter().copied().collect()
}

/// Distinct language names, sorted, for `--languages` help and the
/// `languages` subcommand.
pub fn supported_languages() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = LANGUAGE_BY_EXTENSION
        .iter()
        .map(|(_, language)| *language)
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_resolves_common_extensions() {
        let map = language_map();
        assert_eq!(map.get(".py"), Some(&"Python"));
        assert_eq!(map.get(".rs"), Some(&"Rust"));
        assert_eq!(map.get(".tf"), Some(&"Terraform"));
        assert_eq!(map.get(".exe"), None);
    }

    #[test]
    fn supported_languages_are_sorted_and_unique() {
        let names = supported_languages();
        assert!(names.contains(&"Python"));
        assert!(names.contains(&"HCL"));
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
    }
}
