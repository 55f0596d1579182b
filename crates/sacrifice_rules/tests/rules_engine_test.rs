//! Tests for the chess rules adapter.

use sacrifice_rules::{ChessRules, GameStatus, MoveError, MoveSpec, RulesEngine, STARTING_FEN, Side};

fn play(rules: &mut ChessRules, moves: &[(&str, &str)]) {
    for (from, to) in moves {
        rules
            .apply(&MoveSpec::new(*from, *to))
            .unwrap_or_else(|e| panic!("{}-{} should be legal: {}", from, to, e));
    }
}

fn placement(fen: &str) -> &str {
    fen.split_whitespace().next().expect("FEN has a placement field")
}

#[test]
fn test_new_engine_is_at_start() {
    let rules = ChessRules::new();
    assert_eq!(rules.fen(), STARTING_FEN);
    assert!(rules.is_initial());
    assert_eq!(rules.turn(), Side::White);
    assert_eq!(rules.status(), GameStatus::InProgress);
}

#[test]
fn test_pawn_push_updates_position_and_turn() {
    let mut rules = ChessRules::new();
    play(&mut rules, &[("e2", "e4")]);

    let fen = rules.fen();
    assert_eq!(placement(&fen), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    assert_eq!(fen.split_whitespace().nth(1), Some("b"));
    assert!(fen.ends_with(" 0 1"));
    assert_eq!(rules.turn(), Side::Black);
    assert!(!rules.is_initial());
}

#[test]
fn test_move_counters() {
    let mut rules = ChessRules::new();
    play(&mut rules, &[("g1", "f3")]);
    assert!(rules.fen().ends_with(" 1 1"));

    play(&mut rules, &[("g8", "f6")]);
    assert!(rules.fen().ends_with(" 2 2"));

    play(&mut rules, &[("e2", "e4")]);
    assert!(rules.fen().ends_with(" 0 2"));
}

fn en_passant_field(fen: &str) -> &str {
    fen.split_whitespace().nth(3).expect("FEN has an en-passant field")
}

#[test]
fn test_en_passant_field_names_capture_square() {
    let mut rules = ChessRules::new();
    play(&mut rules, &[("e2", "e4"), ("d7", "d5"), ("e4", "e5")]);
    assert_eq!(en_passant_field(&rules.fen()), "-");

    play(&mut rules, &[("f7", "f5")]);
    let fen = rules.fen();
    assert_eq!(fen, "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    assert_eq!(rules.legal_destinations("e5"), vec!["e6", "f6"]);

    let reloaded = ChessRules::from_fen(&fen).expect("own FEN parses");
    assert_eq!(reloaded.fen(), fen);

    play(&mut rules, &[("e5", "f6")]);
    assert_eq!(
        placement(&rules.fen()),
        "rnbqkbnr/ppp1p1pp/5P2/3p4/8/8/PPPP1PPP/RNBQKBNR"
    );
}

#[test]
fn test_en_passant_field_for_black_to_move() {
    let mut rules = ChessRules::new();
    play(
        &mut rules,
        &[("a2", "a3"), ("d7", "d5"), ("a3", "a4"), ("d5", "d4"), ("e2", "e4")],
    );
    assert_eq!(en_passant_field(&rules.fen()), "e3");
    assert!(rules.legal_destinations("d4").contains(&"e3".to_string()));
}

#[test]
fn test_illegal_move_leaves_position_untouched() {
    let mut rules = ChessRules::new();
    let before = rules.fen();

    let result = rules.apply(&MoveSpec::new("e2", "e5"));
    assert_eq!(
        result,
        Err(MoveError::Illegal {
            from: "e2".to_string(),
            to: "e5".to_string()
        })
    );
    assert_eq!(rules.fen(), before);
}

#[test]
fn test_moving_opponents_piece_is_illegal() {
    let mut rules = ChessRules::new();
    let result = rules.apply(&MoveSpec::new("e7", "e5"));
    assert!(matches!(result, Err(MoveError::Illegal { .. })));
    assert_eq!(rules.turn(), Side::White);
}

#[test]
fn test_empty_origin_square() {
    let mut rules = ChessRules::new();
    let result = rules.apply(&MoveSpec::new("e4", "e5"));
    assert_eq!(result, Err(MoveError::NoPieceToMove("e4".to_string())));
}

#[test]
fn test_malformed_squares() {
    let mut rules = ChessRules::new();
    assert!(matches!(
        rules.apply(&MoveSpec::new("i9", "e4")),
        Err(MoveError::MalformedSquare(_))
    ));
    assert!(matches!(
        rules.apply(&MoveSpec::new("e2", "")),
        Err(MoveError::MalformedSquare(_))
    ));
    assert!(rules.is_initial());
}

#[test]
fn test_fools_mate() {
    let mut rules = ChessRules::new();
    play(
        &mut rules,
        &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")],
    );

    let status = rules.status();
    assert_eq!(status, GameStatus::Checkmate { winner: Side::Black });
    assert!(status.is_over());
    assert_eq!(status.winner(), Some(Side::Black));

    // No legal replies once mated.
    assert!(rules.apply(&MoveSpec::new("a2", "a3")).is_err());
}

#[test]
fn test_promotion_defaults_to_queen() {
    let mut rules = ChessRules::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("valid FEN");
    rules.apply(&MoveSpec::new("a7", "a8")).expect("promotion is legal");
    assert_eq!(placement(&rules.fen()), "Q7/8/8/8/8/8/8/k6K");
}

#[test]
fn test_underpromotion() {
    let mut rules = ChessRules::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("valid FEN");
    rules
        .apply(&MoveSpec::new("a7", "a8").with_promotion("n"))
        .expect("knight promotion is legal");
    assert_eq!(placement(&rules.fen()), "N7/8/8/8/8/8/8/k6K");
}

#[test]
fn test_bad_promotion_letter() {
    let mut rules = ChessRules::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("valid FEN");
    let result = rules.apply(&MoveSpec::new("a7", "a8").with_promotion("k"));
    assert_eq!(result, Err(MoveError::MalformedPromotion("k".to_string())));
}

#[test]
fn test_promotion_letter_ignored_for_ordinary_moves() {
    let mut rules = ChessRules::new();
    rules
        .apply(&MoveSpec::new("e2", "e4").with_promotion("q"))
        .expect("promotion field is irrelevant here");
    assert_eq!(rules.turn(), Side::Black);
}

#[test]
fn test_legal_destinations() {
    let rules = ChessRules::new();

    let pawn = rules.legal_destinations("e2");
    assert_eq!(pawn.len(), 2);
    assert!(pawn.contains(&"e3".to_string()));
    assert!(pawn.contains(&"e4".to_string()));

    let knight = rules.legal_destinations("g1");
    assert_eq!(knight.len(), 2);
    assert!(knight.contains(&"f3".to_string()));
    assert!(knight.contains(&"h3".to_string()));
}

#[test]
fn test_legal_destinations_degrade_to_empty() {
    let rules = ChessRules::new();
    assert!(rules.legal_destinations("e4").is_empty(), "empty square");
    assert!(rules.legal_destinations("e7").is_empty(), "opponent's piece");
    assert!(rules.legal_destinations("zz").is_empty(), "not a square");
    assert!(rules.legal_destinations("").is_empty(), "empty string");
}

#[test]
fn test_legal_destinations_collapse_promotions() {
    let rules = ChessRules::from_fen("8/P7/8/8/8/8/8/k6K w - - 0 1").expect("valid FEN");
    assert_eq!(rules.legal_destinations("a7"), vec!["a8".to_string()]);
}

#[test]
fn test_stalemate() {
    let rules = ChessRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("valid FEN");
    assert_eq!(rules.status(), GameStatus::Stalemate);
}

#[test]
fn test_insufficient_material() {
    let bare_kings = ChessRules::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").expect("valid FEN");
    assert_eq!(bare_kings.status(), GameStatus::InsufficientMaterial);

    let lone_knight = ChessRules::from_fen("8/8/8/4k3/8/8/8/4KN2 w - - 0 1").expect("valid FEN");
    assert_eq!(lone_knight.status(), GameStatus::InsufficientMaterial);

    let rook = ChessRules::from_fen("8/8/8/4k3/8/8/8/4KR2 w - - 0 1").expect("valid FEN");
    assert_eq!(rook.status(), GameStatus::InProgress);
}

#[test]
fn test_threefold_repetition() {
    let mut rules = ChessRules::new();
    let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];
    play(&mut rules, &shuffle);
    assert_eq!(rules.status(), GameStatus::InProgress);

    play(&mut rules, &shuffle);
    assert_eq!(rules.status(), GameStatus::ThreefoldRepetition);

    // Draws are informational; play may continue.
    play(&mut rules, &[("e2", "e4")]);
    assert_eq!(rules.status(), GameStatus::InProgress);
}

#[test]
fn test_fifty_move_rule() {
    let mut rules =
        ChessRules::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 99 80").expect("valid FEN");
    assert_eq!(rules.status(), GameStatus::InProgress);

    play(&mut rules, &[("a1", "a2")]);
    assert!(rules.fen().ends_with(" 100 80"));
    assert_eq!(rules.status(), GameStatus::FiftyMoveRule);
}

#[test]
fn test_reset_restores_start() {
    let mut rules = ChessRules::new();
    play(&mut rules, &[("d2", "d4"), ("d7", "d5")]);
    rules.reset();
    assert_eq!(rules.fen(), STARTING_FEN);
    assert_eq!(rules.turn(), Side::White);
}

#[test]
fn test_from_fen_rejects_garbage() {
    assert!(ChessRules::from_fen("not a position").is_none());
}

#[test]
fn test_wire_encoding() {
    assert_eq!(serde_json::to_string(&Side::White).unwrap(), "\"w\"");
    assert_eq!(Side::Black.to_string(), "b");
    assert_eq!(Side::White.opponent(), Side::Black);
    assert_eq!("b".parse::<Side>().ok(), Some(Side::Black));

    let mv: MoveSpec = serde_json::from_str(r#"{"from":"e2","to":"e4"}"#).unwrap();
    assert_eq!(mv, MoveSpec::new("e2", "e4"));
    assert_eq!(mv.promotion_or_queen(), "q");
}
