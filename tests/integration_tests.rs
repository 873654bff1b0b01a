mod common;

use arena_mcts::{
    config::BestChildCriteria, GameRules, MCTSConfig, MCTSError, SearchNode, StackArena,
    StopReason, MCTS,
};
use common::{Board, TicTacToe, Uniform, O, X};

#[test]
fn test_mcts_basic_functionality() {
    common::init_logging();

    let config = MCTSConfig::default()
        .with_exploration_constant(1.414)
        .with_max_iterations_per_thread(100);

    let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);

    let result = mcts.search();
    assert!(result.is_ok(), "MCTS search should succeed");
    assert!(result.unwrap() < 9, "Action should be valid");

    let stats = mcts.get_statistics();
    assert_eq!(stats.iterations, 100, "Should have performed expected iterations");
    assert_eq!(stats.iterations_per_worker, vec![100]);
    assert!(stats.tree_size > 1, "Tree should have grown");
    assert_eq!(stats.stop_reason, StopReason::IterationLimit);
    assert!(!stats.stopped_early);
}

#[test]
fn test_mcts_finds_winning_move() {
    // X X .
    // O O .
    // . . .
    let game = Board::from_picture("XX. OO. ...", X);

    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(1_000)
        .with_seed(3)
        .with_best_child_criteria(BestChildCriteria::MostVisits);

    let mut mcts = MCTS::new(TicTacToe, game, config);

    assert_eq!(mcts.search().unwrap(), 2, "MCTS should find the winning move");
}

#[test]
fn test_mcts_blocks_opponent() {
    // X . .
    // O O .
    // X . .
    let game = Board::from_picture("X.. OO. X..", X);

    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(5_000)
        .with_seed(11);

    let mut mcts = MCTS::new(TicTacToe, game, config);

    assert_eq!(mcts.search().unwrap(), 5, "MCTS should block the open row");
}

#[test]
fn test_empty_board_selects_center() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(20_000)
        .with_seed(1);

    let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);

    assert_eq!(mcts.search().unwrap(), 4, "Center is the strongest opening");
}

#[test]
fn test_seeded_search_is_deterministic() {
    let run = || {
        let config = MCTSConfig::default()
            .with_max_iterations_per_thread(2_000)
            .with_seed(99);
        let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);
        let action = mcts.search().unwrap();
        (action, mcts.get_statistics().root_children.clone())
    };

    let (first_action, first_stats) = run();
    let (second_action, second_stats) = run();

    assert_eq!(first_action, second_action);
    assert_eq!(first_stats, second_stats);
}

#[test]
fn test_single_action_skips_search() {
    // X O X
    // X O O
    // O X .
    let game = Board::from_picture("XOX XOO OX.", X);

    let mut mcts = MCTS::new(TicTacToe, game, MCTSConfig::default());

    assert_eq!(mcts.search().unwrap(), 8);

    let stats = mcts.get_statistics();
    assert_eq!(stats.iterations, 0);
    assert_eq!(stats.stop_reason, StopReason::SingleAction);
    assert!(mcts.tree().is_none(), "No tree should have been built");
}

#[test]
fn test_empty_game_state() {
    // A drawn, full board
    let game = Board::from_picture("XOX XOO OXX", O);

    let mut mcts = MCTS::new(TicTacToe, game, MCTSConfig::default());

    match mcts.search() {
        Err(e) => assert!(
            format!("{}", e).contains("No legal actions"),
            "Error should indicate no legal actions"
        ),
        Ok(action) => panic!("Unexpected action {action}"),
    }
}

#[test]
fn test_won_position_has_no_legal_actions() {
    // Empty cells remain, but X already won.
    let game = Board::from_picture("XXX OO. ...", O);

    let mut mcts = MCTS::new(TicTacToe, game, MCTSConfig::default());

    assert!(matches!(mcts.search(), Err(MCTSError::NoLegalActions)));
}

#[test]
fn test_root_visits_match_iterations() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(500)
        .with_seed(5);

    let mut mcts = MCTS::new(Uniform::new(3, 6), Default::default(), config);
    mcts.search().unwrap();

    let tree = mcts.tree().expect("single-threaded search keeps its tree");
    let root = tree.root().unwrap();
    assert_eq!(root.visits(), 501, "construction plus one visit per iteration");
}

#[test]
fn test_node_statistics_invariants() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(3_000)
        .with_seed(8);

    let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);
    mcts.search().unwrap();

    let tree = mcts.tree().unwrap();
    let mut nodes = 0;
    tree.for_each_node(|_, node| {
        nodes += 1;
        assert!(node.wins() <= node.visits(), "wins exceed visits: {:?}", node);

        let child_visits: u64 = node
            .children()
            .map(|(_, id)| tree.node(id).unwrap().visits())
            .sum();
        assert!(
            node.visits() >= 1 + child_visits,
            "visits {} below 1 + children {}",
            node.visits(),
            child_visits
        );

        if node.is_terminal() {
            assert_eq!(node.child_count(), 0);
        }
    });
    assert_eq!(nodes, tree.node_count());
}

#[test]
fn test_children_expand_in_action_order() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(4)
        .with_seed(2);

    let mut mcts = MCTS::new(Uniform::new(5, 4), Default::default(), config);
    mcts.search().unwrap();

    let root = mcts.tree().unwrap().root().unwrap();
    let expanded: Vec<usize> = root.children().map(|(index, _)| index).collect();
    assert_eq!(expanded, vec![0, 1, 2, 3]);
    assert!(!root.is_fully_expanded());
}

#[test]
fn test_terminal_nodes_never_expand() {
    let rules = Uniform::new(2, 1);
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(50)
        .with_seed(4);

    let mut mcts = MCTS::new(rules, Default::default(), config);
    mcts.search().unwrap();

    let tree = mcts.tree().unwrap();
    assert_eq!(tree.node_count(), 3, "root plus its two terminal children");
    let root = tree.root().unwrap();
    for (_, id) in root.children() {
        let child = tree.node(id).unwrap();
        assert!(child.is_terminal());
        assert!(child.actions().is_empty());
        assert_eq!(child.child_count(), 0);
    }
    assert_eq!(
        mcts.rules().terminal_enumerations(),
        0,
        "actions are never enumerated for terminal states"
    );
}

#[test]
fn test_full_arena_stops_search() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(1_000)
        .with_max_nodes_per_thread(10)
        .with_seed(6);

    let mut mcts = MCTS::new(Uniform::new(3, 8), Default::default(), config);
    let action = mcts.search().unwrap();
    assert!(action < 3);

    let stats = mcts.get_statistics();
    assert_eq!(stats.stop_reason, StopReason::ArenaFull);
    assert_eq!(stats.iterations, 9, "one expansion per iteration until full");
    assert_eq!(stats.tree_size, 10);
}

#[test]
fn test_full_arena_keeps_simulating() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(200)
        .with_max_nodes_per_thread(10)
        .with_halt_on_full_arena(false)
        .with_seed(6);

    let mut mcts = MCTS::new(Uniform::new(3, 8), Default::default(), config);
    let action = mcts.search().unwrap();
    assert!(action < 3);

    let stats = mcts.get_statistics();
    assert_eq!(stats.iterations, 200);
    assert_eq!(stats.tree_size, 10);

    let tree = mcts.tree().unwrap();
    assert_eq!(tree.root().unwrap().visits(), 201);
    tree.for_each_node(|_, node| assert!(node.wins() <= node.visits()));
}

#[test]
fn test_root_only_arena_falls_back_to_first_action() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(100)
        .with_max_nodes_per_thread(1);

    let mut mcts = MCTS::new(Uniform::new(3, 4), Default::default(), config);

    assert_eq!(mcts.search().unwrap(), 0);
    assert_eq!(mcts.get_statistics().iterations, 0);
}

#[test]
fn test_stack_arena_engine() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(300)
        .with_seed(12);

    let mut mcts: MCTS<TicTacToe, StackArena<SearchNode<TicTacToe>>> =
        MCTS::with_arena(TicTacToe, Board::from_picture("XX. OO. ...", X), config);

    assert_eq!(mcts.search().unwrap(), 2);
    assert_eq!(mcts.get_statistics().tree_size, mcts.tree().unwrap().node_count());
}

#[test]
fn test_recycled_arenas_are_reused() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(200)
        .with_seed(21);

    let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);
    let first = mcts.search().unwrap();

    mcts.recycle_tree();
    assert!(mcts.tree().is_none());

    let second = mcts.search().unwrap();
    assert_eq!(first, second, "same seed, same tree");
    assert_eq!(mcts.tree().unwrap().root().unwrap().visits(), 201);
}

#[test]
fn test_set_root_state_advances_game() {
    let config = MCTSConfig::default()
        .with_max_iterations_per_thread(500)
        .with_seed(13);

    let mut mcts = MCTS::new(TicTacToe, Board::empty(), config);
    let opening = mcts.search().unwrap();

    let next = mcts.rules().transition(mcts.root_state(), &opening);
    mcts.set_root_state(next.clone());
    assert_eq!(mcts.root_state(), &next);

    let reply = mcts.search().unwrap();
    assert_ne!(reply, opening, "the reply must use an empty cell");
}
