use super::*;

#[test]
fn test_validate_structure_passes_balanced_document() {
    let text = r"\documentclass{article}
\begin{document}
\section{Intro%%##$intro>>}
\begin{itemize}
  \item {\bf First} item with \{literal\} braces
  \item Second
\end{itemize}
\begin{figure}\caption{A figure%%##$fig>>}\end{figure}
\end{document}
";
    assert_eq!(validate_structure(text), Ok(()));
}

#[test]
fn test_validate_structure_rejects_unclosed_itemize() {
    let text = "\\begin{itemize}\n\\item x\n";
    let err = validate_structure(text).unwrap_err();
    match &err {
        StructuralError::EnvironmentCountMismatch { name, offset, .. } => {
            assert_eq!(name, "itemize");
            assert_eq!(*offset, 0);
        }
        other => panic!("Expected EnvironmentCountMismatch, got {:?}", other),
    }
    assert!(err.to_string().contains("itemize"));
}

#[test]
fn test_validate_structure_reports_earliest_error() {
    // Stray brace at offset 28, unclosed environment at offset 0.
    let text = "\\begin{center}\n\\textbf{bold}}\n";
    let err = validate_structure(text).unwrap_err();
    assert!(matches!(err, StructuralError::EnvironmentCountMismatch { .. }));
    assert_eq!(err.offset(), 0);
}

#[test]
fn test_validator_collects_both_checks() {
    let mut validator = StructureValidator::new();
    validator.validate("{\\begin{a}");
    assert_eq!(validator.errors().len(), 2);
    assert_eq!(
        validator.errors()[0],
        StructuralError::UnmatchedOpeningBrace { offset: 0 }
    );
}

#[test]
fn test_validator_empty_text() {
    let mut validator = StructureValidator::default();
    validator.validate("");
    assert!(!validator.has_errors());
    assert_eq!(validator.into_first_error(), None);
}

#[test]
fn test_error_messages() {
    let err = StructuralError::UnmatchedBegin {
        name: "table".to_string(),
        offset: 3,
    };
    assert_eq!(err.to_string(), "\\begin{table} has no matching \\end{table}");
}
