use ferroloc_core::pipeline::{check_sources, check_tree, rebase, update, update_all};
use ferroloc_core::{Config, Error, StructuralError, TranslationStore};
use ferroloc_syntax::Location;
use std::fs;
use std::path::{Path, PathBuf};

const MAIN: &str = r"\documentclass{article}
\begin{document}
\section{Welcome%%##$welcome>>}
%%!!lead<<
This manual explains the app.
%%!!>>
\input{guide/intro}
\input{appendix}
\end{document}
";

const INTRO: &str = r"\subsection{Getting \emph{started}%%##$start>>}
%%!!k1<<
  Open the app and tap \textbf{Scan}.
Results appear below.
%%!!>>
\begin{itemize}
\item plain
\end{itemize}
";

const APPENDIX: &str = "No markers here: \\{ok\\}.\n";

struct Project {
    _dir: tempfile::TempDir,
    root: PathBuf,
    config: Config,
}

impl Project {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let config = Config {
            source_dir: root.join("src"),
            store_dir: root.join("l10n"),
            output_dir: root.join("build"),
            languages: vec!["de".to_string()],
            ..Config::default()
        };
        let project = Project {
            _dir: dir,
            root,
            config,
        };
        project.write_source("main.tex", MAIN);
        project.write_source("guide/intro.tex", INTRO);
        project.write_source("appendix.tex", APPENDIX);
        project
    }

    fn write_source(&self, name: &str, content: &str) {
        let path = self.config.source_dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn output(&self, language: &str, name: &str) -> String {
        fs::read_to_string(self.config.output_dir.join(language).join(name)).unwrap()
    }

    /// Rebases and seeds the German store with the untranslated entries.
    fn seed_german(&self) -> TranslationStore {
        rebase(&self.config).unwrap();
        let mut store = TranslationStore::load(&self.config.source_store_path()).unwrap();
        store.language = Some("de".to_string());
        store
    }

    fn save_german(&self, store: &TranslationStore) {
        let path = self.config.language_store_path("de").unwrap();
        store.save(&path).unwrap();
    }
}

#[test]
fn test_rebase_namespaces_every_file() {
    let project = Project::new();
    let report = rebase(&project.config).unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.entries, 4);
    assert_eq!(report.key_warnings, 0);
    assert_eq!(report.outside_includes, 0);
    assert_eq!(report.store_path, project.root.join("l10n").join("strings.json"));

    let store = TranslationStore::load(&report.store_path).unwrap();
    let keys: Vec<_> = store.entries.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["main$$welcome", "main$lead", "guide$intro$$start", "guide$intro$k1"]
    );
    assert_eq!(
        store.raw("guide$intro$k1"),
        Some("Open the app and tap \\\\textbf{Scan}.\\nResults appear below.")
    );
    assert_eq!(
        store.get("guide$intro$$start").as_deref(),
        Some(r"Getting \emph{started}")
    );
    let sources: Vec<_> = store.sources.keys().map(String::as_str).collect();
    assert_eq!(sources, vec!["appendix.tex", "guide/intro.tex", "main.tex"]);
}

#[test]
fn test_untranslated_update_reproduces_sources() {
    let project = Project::new();
    let store = project.seed_german();
    project.save_german(&store);

    let report = update(&project.config, "de").unwrap();
    assert_eq!(report.rewritten, 2);
    assert_eq!(report.copied, 1);
    assert_eq!(report.replaced_units, 4);
    assert_eq!(report.unknown_keys, 0);
    assert_eq!(report.stale_files, 0);

    assert_eq!(project.output("de", "main.tex"), MAIN);
    assert_eq!(project.output("de", "guide/intro.tex"), INTRO);
    assert_eq!(project.output("de", "appendix.tex"), APPENDIX);
}

#[test]
fn test_translated_update() {
    let project = Project::new();
    let mut store = project.seed_german();
    store.insert("main$$welcome".to_string(), "Willkommen");
    store.insert(
        "guide$intro$k1".to_string(),
        "Öffne die App und tippe auf \\textbf{Scannen}.\nErgebnisse erscheinen unten.",
    );
    store.insert("main$gone".to_string(), "Nicht mehr da");
    store.insert("removed$body".to_string(), "Datei entfernt");
    project.save_german(&store);

    let report = update(&project.config, "de").unwrap();
    assert_eq!(report.unknown_keys, 1);
    assert_eq!(report.orphaned_entries, 1);

    let main = project.output("de", "main.tex");
    assert!(main.contains("\\section{Willkommen%%##$welcome>>}\n"));
    assert!(main.contains("%%!!lead<<\nThis manual explains the app.\n%%!!>>\n"));

    let intro = project.output("de", "guide/intro.tex");
    assert_eq!(
        intro,
        r"\subsection{Getting \emph{started}%%##$start>>}
%%!!k1<<
  Öffne die App und tippe auf \textbf{Scannen}.
Ergebnisse erscheinen unten.
%%!!>>
\begin{itemize}
\item plain
\end{itemize}
"
    );
}

#[test]
fn test_update_replaces_previous_output() {
    let project = Project::new();
    let store = project.seed_german();
    project.save_german(&store);

    let old = project.config.output_dir.join("de").join("old.tex");
    fs::create_dir_all(old.parent().unwrap()).unwrap();
    fs::write(&old, "left over").unwrap();

    update(&project.config, "de").unwrap();
    assert!(!old.exists());
    assert_eq!(project.output("de", "appendix.tex"), APPENDIX);
}

#[test]
fn test_structural_error_aborts_without_output() {
    let project = Project::new();
    let mut store = project.seed_german();
    store.insert("guide$intro$$start".to_string(), "Kaputt {");
    project.save_german(&store);

    let previous = project.config.output_dir.join("de").join("main.tex");
    fs::create_dir_all(previous.parent().unwrap()).unwrap();
    fs::write(&previous, "previous build").unwrap();

    let err = update(&project.config, "de").unwrap_err();
    match &err {
        Error::TranslatedStructure {
            language,
            path,
            location,
            source,
        } => {
            assert_eq!(language, "de");
            assert_eq!(*path, project.config.source_dir.join("guide/intro.tex"));
            assert_eq!(*location, Location::new(1, 12));
            assert!(matches!(
                source,
                StructuralError::UnmatchedOpeningBrace { .. }
            ));
        }
        other => panic!("Expected a structural error, got {:?}", other),
    }

    // The previous build is untouched and no staging directory is left behind.
    assert!(err.to_string().ends_with("(in the 'de' translation)"));
    assert_eq!(fs::read_to_string(&previous).unwrap(), "previous build");
    let entries: Vec<_> = fs::read_dir(&project.config.output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["de"]);
}

#[test]
fn test_output_conflict() {
    let project = Project::new();
    let store = project.seed_german();
    project.save_german(&store);

    fs::create_dir_all(&project.config.output_dir).unwrap();
    fs::write(project.config.output_dir.join("de"), "not a directory").unwrap();

    let err = update(&project.config, "de").unwrap_err();
    assert!(matches!(err, Error::OutputConflict { ref path } if path.ends_with("de")));
}

#[test]
fn test_stale_sources_are_counted() {
    let project = Project::new();
    let store = project.seed_german();
    project.save_german(&store);
    project.write_source("appendix.tex", "Edited after rebase.\n");

    let report = update(&project.config, "de").unwrap();
    assert_eq!(report.stale_files, 1);
    assert_eq!(project.output("de", "appendix.tex"), "Edited after rebase.\n");
}

#[test]
fn test_includes_outside_the_source_dir_are_never_written() {
    let project = Project::new();
    let shared = project.root.join("shared.tex");
    let outside = project.root.join("outside.tex");
    let block = "%%!!body<<\nOriginal\n%%!!>>\n";
    fs::write(&shared, block).unwrap();
    fs::write(&outside, block).unwrap();
    project.write_source(
        "main.tex",
        &format!(
            "\\input{{../outside}}\n\\input{{{}}}\n{}",
            project.root.join("shared").display(),
            block
        ),
    );

    let report = rebase(&project.config).unwrap();
    assert_eq!(report.files, 1);
    assert_eq!(report.outside_includes, 2);
    let mut store = TranslationStore::load(&report.store_path).unwrap();
    let keys: Vec<_> = store.entries.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["main$body"]);

    store.insert("main$body".to_string(), "Übersetzt");
    store.insert("outside$body".to_string(), "Übersetzt");
    store.insert("shared$body".to_string(), "Übersetzt");
    project.save_german(&store);

    let report = update(&project.config, "de").unwrap();
    assert_eq!(report.rewritten, 1);
    assert_eq!(report.orphaned_entries, 2);
    assert_eq!(fs::read_to_string(&shared).unwrap(), block);
    assert_eq!(fs::read_to_string(&outside).unwrap(), block);
    let built: Vec<_> = fs::read_dir(&project.config.output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(built, vec!["de"]);
    assert!(project.output("de", "main.tex").contains("Übersetzt"));
}

#[test]
fn test_malformed_keys_are_translated() {
    let project = Project::new();
    project.write_source(
        "main.tex",
        "%%!!a$b<<\nOriginal\n%%!!>>\n\\section{T%%##$x$y>>}\n\\input{guide/intro}\n",
    );

    let report = rebase(&project.config).unwrap();
    assert_eq!(report.key_warnings, 2);
    let mut store = TranslationStore::load(&report.store_path).unwrap();
    store.insert("main$a$b".to_string(), "Übersetzt");
    store.insert("main$$x$y".to_string(), "Titel");
    project.save_german(&store);

    let report = update(&project.config, "de").unwrap();
    assert_eq!(report.orphaned_entries, 0);
    assert_eq!(report.unknown_keys, 0);
    assert_eq!(report.replaced_units, 4);
    assert_eq!(
        project.output("de", "main.tex"),
        "%%!!a$b<<\nÜbersetzt\n%%!!>>\n\\section{Titel%%##$x$y>>}\n\\input{guide/intro}\n"
    );
    assert_eq!(project.output("de", "guide/intro.tex"), INTRO);
}

#[test]
fn test_missing_include_is_not_fatal() {
    let project = Project::new();
    project.write_source("main.tex", "\\input{appendix}\n\\input{missing}\n");

    let report = rebase(&project.config).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.missing_includes, 1);
    assert_eq!(report.entries, 0);
}

#[test]
fn test_syntax_error_names_file_and_position() {
    let project = Project::new();
    project.write_source("guide/intro.tex", "\\subsection{S%%##$s>>}\n%%!!k1<<\nno close\n");

    let err = rebase(&project.config).unwrap_err();
    match &err {
        Error::Syntax { path, location, .. } => {
            assert_eq!(*path, project.config.source_dir.join("guide/intro.tex"));
            assert_eq!(*location, Location::new(2, 1));
        }
        other => panic!("Expected a syntax error, got {:?}", other),
    }
    assert!(err.to_string().ends_with(":2:1: block 'k1' is never closed by a '%%!!>>' line"));
    assert!(!project.config.source_store_path().exists());
}

#[test]
fn test_update_all_uses_configured_languages() {
    let project = Project::new();
    let store = project.seed_german();
    project.save_german(&store);

    let reports = update_all(&project.config, &[]).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].language, "de");

    let err = update_all(&project.config, &["fr".to_string()]).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_invalid_language_is_rejected() {
    let project = Project::new();
    let err = update(&project.config, "../de").unwrap_err();
    assert!(matches!(err, Error::InvalidLanguage(_)));
}

#[test]
fn test_check_sources() {
    let project = Project::new();
    let report = check_sources(&project.config).unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.units, 4);

    project.write_source("appendix.tex", "\\begin{table}\n");
    let err = check_sources(&project.config).unwrap_err();
    assert!(matches!(err, Error::Structure { .. }));
}

#[test]
fn test_check_tree() {
    let project = Project::new();
    let tree = project.root.join("tree");
    fs::create_dir_all(tree.join("nested")).unwrap();
    fs::write(tree.join("a.tex"), "{fine}\n").unwrap();
    fs::write(tree.join("notes.txt"), "}}} ignored\n").unwrap();
    fs::write(tree.join("nested").join("b.tex"), "\\begin{x}\\end{x}\n").unwrap();

    let report = check_tree(&tree).unwrap();
    assert_eq!(report.files, 2);

    fs::write(tree.join("nested").join("c.tex"), "ok\n}\n").unwrap();
    let err = check_tree(&tree).unwrap_err();
    match err {
        Error::Structure { path, location, .. } => {
            assert_eq!(path, tree.join("nested").join("c.tex"));
            assert_eq!(location, Location::new(2, 1));
        }
        other => panic!("Expected a structural error, got {:?}", other),
    }
}

#[test]
fn test_missing_root() {
    let project = Project::new();
    let config = Config {
        root: "absent.tex".to_string(),
        ..project.config.clone()
    };
    assert!(matches!(rebase(&config), Err(Error::MissingRoot { .. })));
    assert!(Path::new(&project.root).join("src").is_dir());
}
