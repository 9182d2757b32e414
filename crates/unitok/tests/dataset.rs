#![allow(missing_docs)]

use std::rc::Rc;

use unitok::{
    Cell,
    Column,
    DataFrame,
    FeatureOptions,
    Sample,
    Selector,
    Status,
    UTResult,
    UnionMode,
    UniTok,
    UnitokError,
    Value,
    tokenizer::{DigitTokenizer, DigitsTokenizer, EntityTokenizer, SplitTokenizer, TokenizerRegistry},
    vocab::{VocabEquality, VocabRef, Vocabulary},
};

fn sample(entries: &[(&str, Cell)]) -> Sample {
    entries
        .iter()
        .map(|(name, cell)| (name.to_string(), cell.clone()))
        .collect()
}

fn entity(vocab: &VocabRef) -> Rc<EntityTokenizer> {
    Rc::new(EntityTokenizer::new(vocab.clone()))
}

/// `nid` (key), `category`, `title` over three news rows.
fn news(nid: &VocabRef) -> UniTok {
    let df = DataFrame::new()
        .with_column("nid", ["n0", "n1", "n2"])
        .unwrap()
        .with_column("category", ["x", "y", "x"])
        .unwrap()
        .with_column("title", ["a b", "b c d", "e"])
        .unwrap();

    let mut ut = UniTok::new();
    ut.add_feature(entity(nid), FeatureOptions::new().with_key(true))
        .unwrap();
    ut.add_feature(
        entity(&Vocabulary::shared("category")),
        FeatureOptions::new(),
    )
    .unwrap();
    ut.add_feature(
        Rc::new(SplitTokenizer::new(Vocabulary::shared("words"), " ")),
        FeatureOptions::new().with_column("title"),
    )
    .unwrap();
    ut.tokenize(&df).unwrap();
    ut
}

/// `imp` (index key) and `nid` over four impression rows.
fn impressions(nid: &VocabRef) -> UniTok {
    let df = DataFrame::new()
        .with_column("nid", ["n2", "n0", "n2", "n1"])
        .unwrap();

    let mut ut = UniTok::new();
    ut.add_index_feature("imp").unwrap();
    ut.add_feature(entity(nid), FeatureOptions::new()).unwrap();
    ut.tokenize(&df).unwrap();
    ut
}

#[test]
fn test_concrete_scenario() {
    let rows = vec![
        vec![("id", Value::from("a")), ("cat", Value::from("x"))],
        vec![("id", Value::from("b")), ("cat", Value::from("y"))],
        vec![("id", Value::from("c")), ("cat", Value::from("x"))],
    ];
    let df = DataFrame::from_rows(rows);

    let id = Vocabulary::shared("id");
    let cat = Vocabulary::shared("cat");

    let mut ut = UniTok::new();
    ut.add_feature(entity(&id), FeatureOptions::new().with_key(true))
        .unwrap();
    ut.add_feature(entity(&cat), FeatureOptions::new()).unwrap();
    ut.tokenize(&df).unwrap();

    assert_eq!(id.tokens(), vec!["a", "b", "c"]);
    assert_eq!(cat.tokens(), vec!["x", "y"]);
    assert_eq!(ut.len(), 3);
    assert_eq!(ut.sample_size(), 3);

    assert_eq!(
        ut.get(0).unwrap(),
        sample(&[("id", Cell::Atom(0)), ("cat", Cell::Atom(0))])
    );
    assert_eq!(
        ut.get(2).unwrap(),
        sample(&[("id", Cell::Atom(2)), ("cat", Cell::Atom(0))])
    );
    assert_eq!(ut.get_by_key("b").unwrap()["cat"], Cell::Atom(1));
    assert!(matches!(
        ut.get(3),
        Err(UnitokError::IndexOutOfRange { index: 3, size: 3 })
    ));

    let picked = ut.get_selected(1, &["cat".into()]).unwrap();
    assert_eq!(picked, sample(&[("cat", Cell::Atom(1))]));

    let all = ut.iter().collect::<UTResult<Vec<_>>>().unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_truncation() {
    let df = DataFrame::new()
        .with_column("id", ["a"])
        .unwrap()
        .with_column("seq", [Value::from(vec![5i64, 6, 7, 8])])
        .unwrap();

    let mut ut = UniTok::new();
    ut.add_feature(
        entity(&Vocabulary::shared("id")),
        FeatureOptions::new().with_key(true),
    )
    .unwrap();

    let digits = Rc::new(DigitsTokenizer::with_options(Vocabulary::shared("seq"), None, None).unwrap());
    ut.add_feature(
        digits.clone(),
        FeatureOptions::new()
            .with_column("seq")
            .with_name("head")
            .with_truncate(2),
    )
    .unwrap();
    ut.add_feature(
        digits,
        FeatureOptions::new()
            .with_column("seq")
            .with_name("tail")
            .with_truncate(-2),
    )
    .unwrap();
    ut.tokenize(&df).unwrap();

    let row = ut.get(0).unwrap();
    assert_eq!(row["head"], Cell::List(vec![5, 6]));
    assert_eq!(row["tail"], Cell::List(vec![7, 8]));
    assert!(ut.feature("head").unwrap().max_len() >= 2);
}

#[test]
fn test_second_key_is_rejected() {
    let mut ut = UniTok::new();
    ut.add_feature(
        entity(&Vocabulary::shared("id")),
        FeatureOptions::new().with_key(true),
    )
    .unwrap();

    assert!(matches!(
        ut.add_feature(
            entity(&Vocabulary::shared("other")),
            FeatureOptions::new().with_key(true)
        ),
        Err(UnitokError::KeyFeatureViolation(_))
    ));
    assert!(matches!(
        ut.add_feature(
            Rc::new(SplitTokenizer::new(Vocabulary::shared("words"), " ")),
            FeatureOptions::new().with_key(true)
        ),
        Err(UnitokError::KeyFeatureViolation(_))
    ));
    assert_eq!(ut.meta().features.len(), 1);
}

#[test]
fn test_tokenize_errors() {
    let nid = Vocabulary::shared("nid");
    let mut ut = news(&nid);

    ut.add_feature(
        entity(&Vocabulary::shared("source")),
        FeatureOptions::new(),
    )
    .unwrap();

    let missing = DataFrame::new()
        .with_column("other", ["s0", "s1", "s2"])
        .unwrap();
    assert!(matches!(
        ut.tokenize(&missing),
        Err(UnitokError::ColumnNotFound(column)) if column == "source"
    ));

    let short = DataFrame::new()
        .with_column("source", ["s0", "s1"])
        .unwrap();
    assert!(matches!(
        ut.tokenize(&short),
        Err(UnitokError::SampleSizeMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert!(!ut.feature("source").unwrap().is_processed());

    let fitting = DataFrame::new()
        .with_column("source", ["s0", "s1", "s0"])
        .unwrap();
    ut.tokenize(&fitting).unwrap();
    let source = ut.feature("source").unwrap();
    assert_eq!(source.order(), 1);
    assert_eq!(ut.get(2).unwrap()["source"], Cell::Atom(0));
}

#[test]
fn test_failed_tokenize_rolls_back_vocabs() {
    let cat = Rc::new(Vocabulary::from_tokens("cat", ["x"]).unwrap());
    let n = Vocabulary::shared("n");

    let mut ut = UniTok::new();
    let imp = ut
        .add_index_feature("imp")
        .unwrap()
        .tokenizer()
        .vocab()
        .clone();
    ut.add_feature(entity(&cat), FeatureOptions::new()).unwrap();
    ut.add_feature(Rc::new(DigitTokenizer::new(n.clone())), FeatureOptions::new())
        .unwrap();

    let bad = DataFrame::new()
        .with_column("cat", ["x", "y", "z", "w"])
        .unwrap()
        .with_column(
            "n",
            vec![Value::Int(1), Value::Int(2), Value::from("oops"), Value::Int(3)],
        )
        .unwrap();
    assert!(matches!(ut.tokenize(&bad), Err(UnitokError::Parse(_))));
    assert_eq!(cat.tokens(), vec!["x"]);
    assert!(imp.is_empty());
    assert!(n.is_empty());
    assert_eq!(ut.status(), Status::Initialized);

    let good = DataFrame::new()
        .with_column("cat", ["y"])
        .unwrap()
        .with_column("n", vec![Value::Int(0)])
        .unwrap();
    ut.tokenize(&good).unwrap();
    assert_eq!(ut.sample_size(), 1);
    assert_eq!(imp.len(), 1);
    assert_eq!(cat.tokens(), vec!["x", "y"]);
    assert_eq!(ut.get(0).unwrap()["cat"], Cell::Atom(1));
}

#[test]
fn test_index_feature() {
    let df = DataFrame::new()
        .with_column("text", ["p", "q", "r"])
        .unwrap();

    let mut ut = UniTok::new();
    let key = ut.add_index_feature("row").unwrap();
    assert_eq!(key.column(), &Column::Index);
    ut.add_feature(
        entity(&Vocabulary::shared("text")),
        FeatureOptions::new(),
    )
    .unwrap();
    ut.tokenize(&df).unwrap();

    let row = ut.key_feature().unwrap().tokenizer().vocab().clone();
    assert_eq!(row.tokens(), vec!["0", "1", "2"]);
    assert_eq!(ut.get_by_key("2").unwrap()["text"], Cell::Atom(2));
}

#[test]
fn test_filter_narrowing() {
    let nid = Vocabulary::shared("nid");
    let mut ut = news(&nid);

    ut.filter_feature("category", |cell| *cell == Cell::Atom(0))
        .unwrap();
    assert_eq!(ut.len(), 2);
    assert_eq!(ut.status(), Status::Organized);

    ut.filter_feature("nid", |cell| cell.as_atom() != Some(0))
        .unwrap();
    assert_eq!(ut.len(), 1);
    assert_eq!(ut.legal_indices(), &[2]);
    assert_eq!(ut.get(0).unwrap()["nid"], Cell::Atom(2));

    assert!(matches!(
        ut.get_by_key("n1"),
        Err(UnitokError::SampleFilteredOut(_))
    ));
    assert!(matches!(
        ut.get_by_key("n9"),
        Err(UnitokError::SampleNotFound(_))
    ));

    ut.filter(|sample| sample["title"].len() < 3).unwrap();
    assert_eq!(ut.len(), 2);
    assert_eq!(ut.legal_indices(), &[0, 2]);

    ut.filter(|_| true).unwrap();
    assert_eq!(ut.len(), 3);
}

#[test]
fn test_soft_union() {
    let nid = Vocabulary::shared("nid");
    let news = Rc::new(news(&nid));
    let mut imp = impressions(&nid);

    imp.union(&news, UnionMode::Soft, None).unwrap();
    assert_eq!(imp.union_mode(), Some(UnionMode::Soft));
    assert!(imp.column("category").is_none());
    assert!(imp.feature("category").unwrap().from_union());

    assert_eq!(
        imp.get(0).unwrap(),
        sample(&[
            ("imp", Cell::Atom(0)),
            ("nid", Cell::Atom(2)),
            ("category", Cell::Atom(0)),
            ("title", Cell::List(vec![4])),
        ])
    );
    for row in imp.iter() {
        let row = row.unwrap();
        assert_eq!(row.len(), 4);
    }

    imp.filter_feature("category", |cell| *cell == Cell::Atom(1))
        .unwrap();
    assert_eq!(imp.legal_indices(), &[3]);

    assert!(matches!(
        imp.retruncate("title", 1),
        Err(UnitokError::SoftUnionConstraint(_))
    ));
    assert!(matches!(
        imp.replicate("title", "headline"),
        Err(UnitokError::SoftUnionConstraint(_))
    ));
    assert!(matches!(
        imp.remove_feature("nid"),
        Err(UnitokError::SoftUnionConstraint(_))
    ));

    assert!(matches!(
        imp.union(&news, UnionMode::Hard, None),
        Err(UnitokError::UnionModeConflict { .. })
    ));
}

#[test]
fn test_hard_union() {
    let nid = Vocabulary::shared("nid");
    let news = Rc::new(news(&nid));
    let mut imp = impressions(&nid);

    imp.union(&news, UnionMode::Hard, Some("nid")).unwrap();
    assert_eq!(
        imp.column("category").unwrap(),
        &[Cell::Atom(0), Cell::Atom(0), Cell::Atom(0), Cell::Atom(1)]
    );
    assert_eq!(
        imp.get(1).unwrap()["title"],
        Cell::List(vec![0, 1])
    );
    assert!(!imp.feature("title").unwrap().from_union());
    assert_eq!(imp.feature("title").unwrap().order(), 1);

    imp.retruncate("title", 1).unwrap();
    assert_eq!(imp.get(3).unwrap()["title"], Cell::List(vec![1]));
    assert_eq!(imp.feature("title").unwrap().max_len(), 1);

    assert!(matches!(
        imp.union(&news, UnionMode::Soft, None),
        Err(UnitokError::UnionModeConflict { .. })
    ));
}

#[test]
fn test_hard_union_with_reloaded_dataset() {
    let cat_tok = |vocab: &VocabRef| {
        Rc::new(EntityTokenizer::with_id(
            vocab.clone(),
            Some("cat_tok".to_string()),
        ))
    };

    tempdir::TempDir::new("unitok")
        .and_then(|dir| {
            let df = DataFrame::new()
                .with_column("nid", ["n0", "n1", "n2"])
                .unwrap()
                .with_column("category", ["x", "y", "x"])
                .unwrap();
            let mut news = UniTok::new();
            news.add_feature(
                entity(&Vocabulary::shared("nid")),
                FeatureOptions::new().with_key(true),
            )
            .unwrap();
            news.add_feature(cat_tok(&Vocabulary::shared("category")), FeatureOptions::new())
                .unwrap();
            news.tokenize(&df).unwrap();
            news.save(dir.path()).unwrap();

            let news = Rc::new(UniTok::load(dir.path()).unwrap());
            assert_eq!(news.feature("category").unwrap().generation(), 1);

            let df = DataFrame::new()
                .with_column("nid", ["n2", "n0", "n2", "n1"])
                .unwrap()
                .with_column("mood", ["x", "y", "x", "y"])
                .unwrap();
            let nid = Rc::new(Vocabulary::from_tokens("nid", ["n0", "n1", "n2"]).unwrap());
            let mut imp = UniTok::new();
            imp.add_index_feature("imp").unwrap();
            imp.add_feature(entity(&nid), FeatureOptions::new()).unwrap();
            imp.add_feature(
                cat_tok(&Vocabulary::shared("category")),
                FeatureOptions::new().with_column("mood"),
            )
            .unwrap();
            imp.tokenize(&df).unwrap();

            imp.union(&news, UnionMode::Hard, None).unwrap();
            let category = imp.feature("category").unwrap();
            assert!(!category.is_stale());
            assert_eq!(
                category.tokenizer().vocab().generation(),
                imp.feature("mood").unwrap().tokenizer().vocab().generation()
            );
            assert_eq!(
                imp.column("category").unwrap(),
                &[Cell::Atom(0), Cell::Atom(0), Cell::Atom(0), Cell::Atom(1)]
            );
            assert_eq!(imp.get(3).unwrap()["category"], Cell::Atom(1));

            imp.save(dir.path().join("joined")).unwrap();
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_union_key_vocab_mismatch() {
    let news = Rc::new(news(&Vocabulary::shared("nid")));

    let wide = Vocabulary::from_tokens("nid", ["n0", "n1", "n2", "n3"]).unwrap();
    let mut imp = impressions(&Rc::new(wide));
    let before = imp.meta().features.len();

    assert!(matches!(
        imp.union(&news, UnionMode::Soft, None),
        Err(UnitokError::UnionKeyVocabMismatch { .. })
    ));
    assert_eq!(imp.meta().features.len(), before);
    assert_eq!(imp.union_mode(), None);
    assert_eq!(imp.status(), Status::Tokenized);
}

#[test]
fn test_union_content_equality() {
    let news = Rc::new(news(&Vocabulary::shared("nid")));

    let shuffled = Rc::new(Vocabulary::from_tokens("nid", ["n2", "n0", "n1"]).unwrap());
    let imp = impressions(&shuffled);
    let mut strict = impressions(&shuffled).with_vocab_equality(VocabEquality::Content);

    assert!(matches!(
        strict.union(&news, UnionMode::Soft, None),
        Err(UnitokError::UnionKeyVocabMismatch { .. })
    ));

    let mut lenient = imp;
    lenient.union(&news, UnionMode::Soft, None).unwrap();
}

#[test]
fn test_union_key_must_exist() {
    let news = Rc::new(news(&Vocabulary::shared("nid")));
    let mut imp = impressions(&Vocabulary::shared("nid"));

    assert!(matches!(
        imp.union(&news, UnionMode::Soft, Some("missing")),
        Err(UnitokError::InvalidUnionKey { .. })
    ));
}

#[test]
fn test_union_name_conflict_is_atomic() {
    let nid = Vocabulary::shared("nid");
    let first = Rc::new(news(&nid));
    let second = Rc::new(news(&nid));
    let mut imp = impressions(&nid);

    imp.union(&first, UnionMode::Soft, None).unwrap();
    let vocabs = imp.meta().vocabularies.len();
    let tokenizers = imp.meta().tokenizers.len();

    assert!(matches!(
        imp.union(&second, UnionMode::Soft, None),
        Err(UnitokError::FeatureNameConflict { .. })
    ));
    assert_eq!(imp.meta().vocabularies.len(), vocabs);
    assert_eq!(imp.meta().tokenizers.len(), tokenizers);
}

#[test]
fn test_replicate_and_remove() {
    let nid = Vocabulary::shared("nid");
    let mut ut = news(&nid);

    let replica = ut.replicate("category", "genre").unwrap();
    assert!(!replica.is_key());
    assert_eq!(ut.column("genre"), ut.column("category"));

    ut.remove_feature("category").unwrap();
    assert!(ut.meta().vocabularies.has("category"));
    assert!(ut.get(0).unwrap().contains_key("genre"));

    let removed = ut.remove_feature("title").unwrap();
    assert!(
        !ut.meta()
            .tokenizers
            .has(removed.tokenizer().tokenizer_id())
    );
    assert!(!ut.meta().vocabularies.has("words"));
    assert!(!ut.get(0).unwrap().contains_key("title"));

    assert!(matches!(
        ut.remove_feature("nid"),
        Err(UnitokError::KeyFeatureViolation(_))
    ));
}

#[test]
fn test_retruncate() {
    let nid = Vocabulary::shared("nid");
    let mut ut = news(&nid);
    assert_eq!(ut.feature("title").unwrap().max_len(), 3);

    ut.retruncate("title", -1).unwrap();
    assert_eq!(ut.get(1).unwrap()["title"], Cell::List(vec![3]));
    assert_eq!(ut.feature("title").unwrap().max_len(), 1);
    assert_eq!(ut.feature("title").unwrap().truncate(), Some(-1));

    assert!(matches!(
        ut.retruncate("category", 1),
        Err(UnitokError::UnexpectedShape(_))
    ));
}

#[test]
fn test_trimmed_vocab_is_stale() {
    let nid = Vocabulary::shared("nid");
    let ut = news(&nid);

    let words = ut.feature("title").unwrap().tokenizer().vocab().clone();
    words.trim(1);

    assert!(matches!(
        ut.get(0),
        Err(UnitokError::StaleVocabulary { .. })
    ));
}

#[test]
fn test_save_load() {
    tempdir::TempDir::new("unitok")
        .and_then(|dir| {
            let nid = Vocabulary::shared("nid");
            let mut ut = news(&nid);
            ut.save(dir.path()).unwrap();
            assert!(dir.path().join("meta.json").exists());
            assert!(dir.path().join("words.vocab").exists());
            assert!(dir.path().join("data.json").exists());

            let loaded = UniTok::load(dir.path()).unwrap();
            assert_eq!(loaded.status(), Status::Tokenized);
            assert_eq!(loaded.sample_size(), 3);
            assert_eq!(loaded.key_feature().unwrap().name(), "nid");
            for index in 0..3 {
                assert_eq!(loaded.get(index).unwrap(), ut.get(index).unwrap());
            }
            assert_eq!(
                loaded.to_string(),
                format!("UniTok({}, size=3)", dir.path().display())
            );

            let title = loaded.feature("title").unwrap();
            assert_eq!(title.tokenizer().classname(), "split");
            assert_eq!(title.max_len(), 3);
            assert_eq!(
                title.tokenizer().vocab().tokens(),
                vec!["a", "b", "c", "d", "e"]
            );

            let summary = loaded.summarize().unwrap();
            assert_eq!(summary.key_feature, "nid");
            assert_eq!(summary.features.len(), 3);
            assert_eq!(summary.features[2].max_len, Some(3));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_save_materializes_soft_union() {
    tempdir::TempDir::new("unitok")
        .and_then(|dir| {
            let nid = Vocabulary::shared("nid");
            let news = Rc::new(news(&nid));
            let mut imp = impressions(&nid);
            imp.union(&news, UnionMode::Soft, None).unwrap();

            imp.save(dir.path()).unwrap();
            let loaded = UniTok::load(dir.path()).unwrap();

            assert_eq!(loaded.union_mode(), None);
            assert!(!loaded.feature("title").unwrap().from_union());
            assert_eq!(loaded.column("title").unwrap().len(), 4);
            for index in 0..4 {
                assert_eq!(loaded.get(index).unwrap(), imp.get(index).unwrap());
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_load_with_unknown_tokenizer() {
    tempdir::TempDir::new("unitok")
        .and_then(|dir| {
            let nid = Vocabulary::shared("nid");
            news(&nid).save(dir.path()).unwrap();

            let mut registry = TokenizerRegistry::empty();
            registry.register(EntityTokenizer::CLASSNAME, |args| {
                TokenizerRegistry::default().build(EntityTokenizer::CLASSNAME, args)
            });
            let mut loaded = UniTok::load_with(dir.path(), &registry).unwrap();

            let title = loaded.feature("title").unwrap();
            assert_eq!(title.tokenizer().detailed_classname(), "unknown[split]");
            assert_eq!(loaded.get(1).unwrap()["title"], Cell::List(vec![1, 2, 3]));

            let resaved = dir.path().join("resaved");
            loaded.save(&resaved).unwrap();
            let reloaded = UniTok::load(&resaved).unwrap();
            assert_eq!(
                reloaded.feature("title").unwrap().tokenizer().classname(),
                "split"
            );
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_select_by_tokenizer_class() {
    let nid = Vocabulary::shared("nid");
    let ut = news(&nid);

    let row = ut.get(0).unwrap();
    let picked = ut
        .select(&row, &[Selector::TokenizerClass("entity".into())])
        .unwrap();
    assert_eq!(
        picked,
        sample(&[("nid", Cell::Atom(0)), ("category", Cell::Atom(0))])
    );
}
