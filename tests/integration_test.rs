/// End-to-end integration tests for the faqrag pipeline.
///
/// Tests the complete flow:
///   Spreadsheet → Group → Index → Retrieve → Format
use faqrag::db::{Db, store_file};
use faqrag::embedder::mock::MockEmbedder;
use faqrag::formatter::{format_answers, parse_table, render_matches};
use faqrag::{AnswerEntry, FaqError, FaqIndex, IdStrategy, IndexBuilder, RetrievalContext, Retriever};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const FAQ_CSV: &str = "\
Pergunta,Idade,Resposta
Qual o horário de atendimento?,0-2 anos,Das 8h às 18h
,3-5 anos,Das 9h às 17h
Posso levar acompanhante?,,Sim | apenas um
nan,6+ anos,Linha descartada
";

fn write_source(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("faq.csv");
    fs::write(&path, contents).unwrap();
    path
}

fn context(dir: &Path) -> RetrievalContext {
    RetrievalContext::new("qa_excel_collection", Some(dir.join("store").as_path()))
}

/// Full pipeline: csv → build → reopen → query → render
#[test]
fn test_full_pipeline() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), FAQ_CSV);
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    // 1. Build from the spreadsheet
    let index = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();
    assert_eq!(index.count().unwrap(), 2, "Should index 2 unique questions");
    assert_eq!(index.info().distance_metric, "cosine");
    assert_eq!(index.info().embedding_model, "mock-32");

    // 2. Forward-filled question carries both answers, in sheet order
    let records = index.records().unwrap();
    assert_eq!(records[0].question, "Qual o horário de atendimento?");
    assert_eq!(
        records[0].answers,
        vec![
            AnswerEntry::new("0-2 anos", "Das 8h às 18h"),
            AnswerEntry::new("3-5 anos", "Das 9h às 17h"),
        ]
    );
    // Blank age becomes N/A
    assert_eq!(records[1].answers, vec![AnswerEntry::new("N/A", "Sim | apenas um")]);
    assert!(
        records.iter().all(|r| r.question != "nan"),
        "Rows with a 'nan' question should be dropped"
    );
    drop(index);

    // 3. Reopen from disk
    let reopened = FaqIndex::open(&ctx).unwrap().expect("collection should persist");
    assert_eq!(reopened.count().unwrap(), 2);

    // 4. Query and render
    let matches = Retriever::new(&embedder).query("Qual o horário de atendimento?", &ctx, 3);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].question, "Qual o horário de atendimento?");
    assert!(matches[0].distance <= matches[1].distance);

    let rendered = render_matches(&matches);
    assert!(rendered.starts_with("### Resultado 1: Qual o horário de atendimento?"));
    assert!(rendered.contains("| N/A | Sim \\| apenas um |"));
}

/// A blank question cell continues the previous question.
#[test]
fn test_forward_filled_question_single_match() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(
        temp_dir.path(),
        "Pergunta,Idade,Resposta\nQual o horário de atendimento?,0-2 anos,Das 8h às 18h\n,3-5 anos,Das 9h às 17h\n",
    );
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    let index = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();
    assert_eq!(index.count().unwrap(), 1);
    drop(index);

    let matches = Retriever::new(&embedder).query("Qual o horário de atendimento?", &ctx, 3);
    assert_eq!(matches.len(), 1);

    let table = format_answers(&matches[0].answers);
    assert_eq!(
        table,
        "| Idade    | Resposta Correspondente |\n\
         | :------- | :---------------------- |\n\
         | 0-2 anos | Das 8h às 18h |\n\
         | 3-5 anos | Das 9h às 17h |"
    );
    assert_eq!(parse_table(&table), matches[0].answers);
}

/// Without force, an existing collection is returned as-is even if the sheet changed.
#[test]
fn test_idempotent_build_ignores_source_changes() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), FAQ_CSV);
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();

    // Source removed entirely: the stored collection is still loaded
    fs::remove_file(&source).unwrap();
    let index = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();
    assert_eq!(index.count().unwrap(), 2);

    // A forced rebuild does need the source
    let err = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, true)
        .err()
        .unwrap();
    assert!(matches!(err, FaqError::SourceNotFound(_)), "got {err:?}");
}

/// A forced rebuild replaces contents and ids.
#[test]
fn test_force_rebuild_replaces_collection() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), FAQ_CSV);
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();

    write_source(
        temp_dir.path(),
        "Pergunta,Idade,Resposta\nQual o valor da consulta?,Todas,R$ 200\n",
    );
    let index = IndexBuilder::new(&embedder)
        .with_id_strategy(IdStrategy::ContentHash)
        .build_from_source(&source, &ctx, true)
        .unwrap();
    assert_eq!(index.count().unwrap(), 1);
    let collection_id = index.info().id;
    drop(index);

    let db = Db::open(store_file(&ctx.storage_location)).unwrap();
    let entries = db.list_entries(collection_id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].question, "Qual o valor da consulta?");
    assert!(entries[0].entry_id.starts_with("q_"));
    assert_eq!(entries[0].entry_id.len(), "q_".len() + 16);
}

/// Sequential ids follow record order.
#[test]
fn test_sequential_ids() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), FAQ_CSV);
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    let index = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();
    let collection_id = index.info().id;
    drop(index);

    let db = Db::open(store_file(&ctx.storage_location)).unwrap();
    let ids: Vec<String> = db
        .list_entries(collection_id)
        .unwrap()
        .into_iter()
        .map(|e| e.entry_id)
        .collect();
    assert_eq!(ids, vec!["q_excel_0", "q_excel_1"]);
}

/// A sheet with only the header row yields EmptyDataset and creates no collection.
#[test]
fn test_empty_sheet() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), "Pergunta,Idade,Resposta\n");
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    let err = IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .err()
        .unwrap();
    assert!(matches!(err, FaqError::EmptyDataset), "got {err:?}");
    assert!(FaqIndex::open(&ctx).unwrap().is_none());
}

/// Retrieval never fails: missing store, empty query results, wrong model.
#[test]
fn test_retrieval_failures_are_empty() {
    let temp_dir = tempdir().unwrap();
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    // Nothing built yet
    let retriever = Retriever::new(&embedder);
    assert!(retriever.query("Qual o horário?", &ctx, 3).is_empty());
    assert_eq!(render_matches(&[]), "Nenhum resultado encontrado.");

    let source = write_source(temp_dir.path(), FAQ_CSV);
    IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();

    // Unknown collection in the same store
    let other = RetrievalContext::new("outra_colecao", Some(ctx.storage_location.as_path()));
    assert!(retriever.query("Qual o horário?", &other, 3).is_empty());

    // Different model than the one the collection was built with
    let other_model = MockEmbedder::new(16);
    assert!(
        Retriever::new(&other_model)
            .query("Qual o horário?", &ctx, 3)
            .is_empty()
    );

    // top_k bounds the result
    assert_eq!(retriever.query("Qual o horário?", &ctx, 1).len(), 1);
    assert!(retriever.query("Qual o horário?", &ctx, 0).is_empty());
}

/// Same store, same model, same query: same answer.
#[test]
fn test_deterministic_results() {
    let temp_dir = tempdir().unwrap();
    let source = write_source(temp_dir.path(), FAQ_CSV);
    let ctx = context(temp_dir.path());
    let embedder = MockEmbedder::new(32);

    IndexBuilder::new(&embedder)
        .build_from_source(&source, &ctx, false)
        .unwrap();

    let retriever = Retriever::new(&embedder);
    let first = retriever.query("acompanhante", &ctx, 3);
    let second = retriever.query("acompanhante", &ctx, 3);
    assert_eq!(first, second);
    assert_eq!(render_matches(&first), render_matches(&second));
}
