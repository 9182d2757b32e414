#![allow(missing_docs)]

use unitok::{
    UnitokError,
    vocab::{OovToken, Vocabulary},
};

#[test]
fn test_ids_are_stable() {
    let vocab = Vocabulary::new("words");
    let tokens = ["the", "cat", "the", "hat", "cat", "the"];

    let first = vocab.extend(tokens).unwrap();
    let second = vocab.extend(tokens).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![0, 1, 0, 2, 1, 0]);
    assert_eq!(vocab.len(), 3);

    for (id, token) in vocab.tokens().iter().enumerate() {
        assert_eq!(vocab.get_id(token), Some(id));
    }
}

#[test]
fn test_save_load_roundtrip() {
    tempdir::TempDir::new("vocab")
        .and_then(|dir| {
            let vocab = Vocabulary::from_tokens("city", ["paris", "rome", "oslo", "kyiv"]).unwrap();
            let path = vocab.save(dir.path()).unwrap();
            assert!(path.ends_with("city.vocab"));

            let loaded = Vocabulary::load_from("city", dir.path()).unwrap();
            assert_eq!(loaded.tokens(), vocab.tokens());
            for token in vocab.tokens() {
                assert_eq!(loaded.get_id(&token), vocab.get_id(&token));
            }
            assert!(loaded.equals(&vocab));
            assert!(loaded.content_equals(&vocab));
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_frozen_vocab() {
    let vocab = Vocabulary::from_tokens("labels", ["<unk>", "pos", "neg"]).unwrap();
    vocab.deny_edit();

    assert!(matches!(
        vocab.append("neutral"),
        Err(UnitokError::VocabNotEditable { .. })
    ));
    assert_eq!(vocab.append_or("neutral", OovToken::Token("<unk>")).unwrap(), 0);
    assert_eq!(vocab.append_or("neutral", OovToken::Id(2)).unwrap(), 2);
    assert_eq!(vocab.append("pos").unwrap(), 1);
    assert_eq!(vocab.len(), 3);
}

#[test]
fn test_line_breaks_are_rejected() {
    let vocab = Vocabulary::new("text");
    assert!(matches!(
        vocab.append("two\nlines"),
        Err(UnitokError::InvalidToken { .. })
    ));
    assert!(vocab.is_empty());
}

#[test]
fn test_trim_keeps_touched_tokens() {
    let vocab = Vocabulary::from_tokens("words", ["a", "b", "c"]).unwrap();
    let before = vocab.tokens();
    let generation = vocab.generation();

    vocab.activate_counter();
    vocab.extend(["c", "a", "b", "a"]).unwrap();
    vocab.trim(1);

    assert_eq!(vocab.tokens(), before);
    assert!(vocab.generation() > generation);
}

#[test]
fn test_trim_drops_rare_tokens() {
    let vocab = Vocabulary::from_tokens("words", ["<pad>", "a", "b", "c"]).unwrap();
    vocab.set_reserved(1);

    vocab.activate_counter();
    vocab.extend(["c", "a", "c", "b", "c"]).unwrap();
    vocab.trim(2);

    assert_eq!(vocab.tokens(), vec!["<pad>", "c"]);
    assert_eq!(vocab.get_id("c"), Some(1));
}
