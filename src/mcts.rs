//! Monte Carlo Tree Search with UCT selection.
//!
//! One search grows a tree rooted at the position to move from. Each
//! iteration:
//! - Select: walk down by UCT through fully expanded nodes; the first node
//!   with an untried column gets one new child, which becomes the leaf
//! - Simulate: play a uniformly random game from the leaf
//! - Backpropagate: add a visit to every node on the way back to the root,
//!   and credit the result to nodes where the searching player has just moved
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]; the parent
//! link is a plain index. The tree is dropped when the search returns.

use std::time::Instant;

use tracing::{debug, trace};

use crate::board::{Board, IllegalMoveError, Player, apply_action, is_terminal, valid_actions};
use crate::config::{MctsConfig, SearchBudget};
use crate::playout::{RandomSource, simulate};

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// How many of a node's columns have been turned into children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Unexpanded,
    PartiallyExpanded,
    FullyExpanded,
}

/// A position in the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Board at this node
    pub board: Board,
    /// Player about to move from this board
    pub player: Player,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// Expanded children keyed by column, in expansion order
    pub children: Vec<(usize, NodeId)>,
    /// Columns not yet expanded
    pub unexpanded: Vec<usize>,
    /// Either side has won or the board is full; fixed at creation
    pub is_terminal: bool,
    /// Number of backpropagations through this node
    pub visits: u32,
    /// Rollout wins credited to this node
    pub wins: u32,
}

impl Node {
    fn new(board: Board, player: Player, parent: Option<NodeId>) -> Self {
        Self {
            board,
            player,
            parent,
            children: Vec::new(),
            unexpanded: valid_actions(&board),
            is_terminal: is_terminal(&board, player) || is_terminal(&board, player.other()),
            visits: 0,
            wins: 0,
        }
    }

    /// Child reached by playing `column`, if it has been expanded.
    pub fn child(&self, column: usize) -> Option<NodeId> {
        self.children
            .iter()
            .find(|&&(c, _)| c == column)
            .map(|&(_, id)| id)
    }

    pub fn expansion(&self) -> Expansion {
        match (self.children.is_empty(), self.unexpanded.is_empty()) {
            (true, false) => Expansion::Unexpanded,
            (false, false) => Expansion::PartiallyExpanded,
            (_, true) => Expansion::FullyExpanded,
        }
    }

    /// Fraction of visits that ended in a credited win.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits > 0 {
            self.wins as f64 / self.visits as f64
        } else {
            0.0
        }
    }

    /// UCT score as seen from a parent with `parent_visits` visits:
    /// `wins/visits + C * sqrt(ln(parent_visits / visits))`.
    ///
    /// Unvisited nodes score `+inf`.
    #[inline]
    pub fn uct_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.wins as f64 / visits + exploration * (parent_visits as f64 / visits).ln().sqrt()
    }
}

/// A single search tree, owned by one call.
#[derive(Debug)]
pub struct Mcts {
    nodes: Vec<Node>,
    designated: Player,
    config: MctsConfig,
}

impl Mcts {
    /// Create a tree whose root is `board` with `player` to move. `player` is
    /// also the side whose wins are counted.
    pub fn new(board: &Board, player: Player, config: MctsConfig) -> Self {
        Self {
            nodes: vec![Node::new(*board, player, None)],
            designated: player,
            config,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run iterations until the configured budget is spent. Returns the
    /// number of iterations performed.
    pub fn run<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<u32, IllegalMoveError> {
        let started = Instant::now();
        let mut iterations = 0;

        match self.config.budget {
            SearchBudget::Iterations(limit) => {
                while iterations < limit {
                    self.iterate(rng)?;
                    iterations += 1;
                }
            }
            // At least one iteration, so a live root always has a child.
            SearchBudget::Timeout(limit) => loop {
                self.iterate(rng)?;
                iterations += 1;
                if started.elapsed() >= limit {
                    break;
                }
            },
        }

        debug!(
            iterations,
            nodes = self.nodes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            best = ?self.best_action(),
            "mcts search finished"
        );
        for (column, visits, wins) in self.root_stats() {
            trace!(column, visits, wins, "root child");
        }

        Ok(iterations)
    }

    /// One select/simulate/backpropagate round.
    pub fn iterate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<(), IllegalMoveError> {
        let leaf = self.select(rng)?;
        let result = self.simulate(leaf, rng)?;
        self.backpropagate(leaf, result);
        Ok(())
    }

    /// Descend from the root by UCT until a node with an untried column is
    /// found (and expanded) or a terminal node is reached.
    pub fn select<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<NodeId, IllegalMoveError> {
        let mut id = self.root();
        while !self.node(id).is_terminal {
            if let Some(child) = self.expand(id, rng)? {
                return Ok(child);
            }
            match self.best_child(id) {
                Some(child) => id = child,
                None => break,
            }
        }
        Ok(id)
    }

    /// Expand one untried column of `id`, chosen uniformly at random.
    ///
    /// Returns `None` when every column has already been expanded.
    pub fn expand<R: RandomSource + ?Sized>(
        &mut self,
        id: NodeId,
        rng: &mut R,
    ) -> Result<Option<NodeId>, IllegalMoveError> {
        let parent = &mut self.nodes[id.0];
        if parent.unexpanded.is_empty() {
            return Ok(None);
        }

        let column = parent.unexpanded.remove(rng.below(parent.unexpanded.len()));
        let board = apply_action(&parent.board, column, parent.player)?;
        let child = Node::new(board, parent.player.other(), Some(id));

        let child_id = NodeId(self.nodes.len());
        self.nodes.push(child);
        self.nodes[id.0].children.push((column, child_id));
        Ok(Some(child_id))
    }

    /// Random rollout from `id`: 1 if the searching player ends up winning.
    pub fn simulate<R: RandomSource + ?Sized>(&self, id: NodeId, rng: &mut R) -> Result<u32, IllegalMoveError> {
        let node = self.node(id);
        simulate(&node.board, node.player, self.designated, rng)
    }

    /// Walk from `leaf` to the root, adding one visit everywhere and crediting
    /// `result` where the opponent of the searching player is to move.
    pub fn backpropagate(&mut self, leaf: NodeId, result: u32) {
        let designated = self.designated;
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.visits += 1;
            if node.player.other() == designated {
                node.wins += result;
            }
            current = node.parent;
        }
    }

    /// Child of `id` with the highest UCT score; ties keep the first child.
    pub fn best_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &node.children {
            let score = self.node(child_id).uct_score(node.visits, self.config.exploration);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((child_id, score));
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    /// Column of the most visited root child; ties keep the first child.
    pub fn best_action(&self) -> Option<usize> {
        let mut best: Option<(usize, u32)> = None;
        for &(column, child_id) in &self.node(self.root()).children {
            let visits = self.node(child_id).visits;
            if best.is_none_or(|(_, most)| visits > most) {
                best = Some((column, visits));
            }
        }
        best.map(|(column, _)| column)
    }

    /// `(column, visits, wins)` for every expanded root child.
    pub fn root_stats(&self) -> Vec<(usize, u32, u32)> {
        self.node(self.root())
            .children
            .iter()
            .map(|&(column, id)| {
                let child = self.node(id);
                (column, child.visits, child.wins)
            })
            .collect()
    }
}

/// Build a tree for `board`, spend the budget, and return the chosen column.
pub fn search<R: RandomSource + ?Sized>(
    board: &Board,
    player: Player,
    config: MctsConfig,
    rng: &mut R,
) -> Result<Option<usize>, IllegalMoveError> {
    let mut tree = Mcts::new(board, player, config);
    tree.run(rng)?;
    Ok(tree.best_action())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::constants::COLS;
    use crate::playout::SequenceSource;

    fn board(rows: [&str; 6]) -> Board {
        format!(
            "|==============|\n{}\n|==============|\n|0 1 2 3 4 5 6 |",
            rows.join("\n")
        )
        .parse()
        .unwrap()
    }

    const EMPTY_ROW: &str = "|              |";

    /// Only columns 4 and 5 are open.
    fn two_open_columns() -> Board {
        board([
            "|X X O X     X |",
            "|O O X O     O |",
            "|X X O X     X |",
            "|O O X O     O |",
            "|X O X O X   X |",
            "|O X X O O   O |",
        ])
    }

    #[test]
    fn test_new_tree_has_bare_root() {
        let tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(1));
        let root = tree.node(tree.root());
        assert_eq!(tree.len(), 1);
        assert_eq!(root.visits, 0);
        assert_eq!(root.unexpanded.len(), COLS);
        assert!(root.parent.is_none());
        assert!(!root.is_terminal);
        assert_eq!(root.expansion(), Expansion::Unexpanded);
    }

    #[test]
    fn test_expand_adds_one_child() {
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(1));
        let mut rng = SequenceSource::new(vec![2]);
        let child = tree.expand(tree.root(), &mut rng).unwrap().unwrap();

        let root = tree.node(tree.root());
        assert_eq!(root.children, vec![(2, child)]);
        assert_eq!(root.unexpanded, vec![0, 1, 3, 4, 5, 6]);
        assert_eq!(root.child(2), Some(child));
        assert_eq!(root.expansion(), Expansion::PartiallyExpanded);

        let node = tree.node(child);
        assert_eq!(node.player, Player::Two);
        assert_eq!(node.parent, Some(tree.root()));
        assert_eq!(node.board.get(0, 2), Some(Player::One));
    }

    #[test]
    fn test_expand_exhausts_columns() {
        let mut tree = Mcts::new(&two_open_columns(), Player::Two, MctsConfig::with_iterations(1));
        let mut rng = SequenceSource::new(vec![1]);
        let first = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let second = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        assert_eq!(tree.expand(tree.root(), &mut rng).unwrap(), None);

        // Index 1 of [4, 5] first, then the only one left.
        let root = tree.node(tree.root());
        assert_eq!(root.children, vec![(5, first), (4, second)]);
        assert_eq!(root.expansion(), Expansion::FullyExpanded);
    }

    #[test]
    fn test_limited_actions_limit_children() {
        let mut tree = Mcts::new(&two_open_columns(), Player::Two, MctsConfig::with_iterations(10));
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(tree.run(&mut rng).unwrap(), 10);
        assert_eq!(tree.node(tree.root()).children.len(), 2);
    }

    #[test]
    fn test_every_root_child_visited_once() {
        let b = board([
            EMPTY_ROW,
            EMPTY_ROW,
            EMPTY_ROW,
            EMPTY_ROW,
            "|    X O       |",
            "|  X O O O     |",
        ]);
        let mut tree = Mcts::new(&b, Player::Two, MctsConfig::with_iterations(7));
        let mut rng = fastrand::Rng::with_seed(11);
        tree.run(&mut rng).unwrap();

        let root = tree.node(tree.root());
        assert_eq!(root.visits, 7);
        for col in 0..COLS {
            let child = root.child(col).expect("every column expanded");
            assert_eq!(tree.node(child).visits, 1);
        }
    }

    #[test]
    fn test_winning_child_is_credited() {
        let b = board([
            EMPTY_ROW,
            EMPTY_ROW,
            EMPTY_ROW,
            EMPTY_ROW,
            "|    X O       |",
            "|  X X O O   O |",
        ]);
        let mut tree = Mcts::new(&b, Player::Two, MctsConfig::with_iterations(7));
        let mut rng = fastrand::Rng::with_seed(5);
        tree.run(&mut rng).unwrap();

        let winner = tree.node(tree.root()).child(5).unwrap();
        assert!(tree.node(winner).is_terminal);
        assert_eq!(tree.node(winner).wins, 1);
        assert_eq!(tree.simulate(winner, &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_root_visits_match_iterations() {
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(300));
        let mut rng = fastrand::Rng::with_seed(99);
        let iterations = tree.run(&mut rng).unwrap();

        let root = tree.node(tree.root());
        let child_visits: u32 = tree.root_stats().iter().map(|&(_, visits, _)| visits).sum();
        assert_eq!(iterations, 300);
        assert_eq!(root.visits, 300);
        assert_eq!(child_visits, 300);
        assert_eq!(root.wins, 0);
    }

    #[test]
    fn test_timeout_budget_runs() {
        let config = MctsConfig::with_timeout(Duration::from_millis(20));
        let mut tree = Mcts::new(&Board::new(), Player::One, config);
        let mut rng = fastrand::Rng::with_seed(4);
        let iterations = tree.run(&mut rng).unwrap();
        assert!(iterations > 0);
        assert_eq!(tree.node(tree.root()).visits, iterations);
    }

    #[test]
    fn test_tiny_timeout_still_picks_a_column() {
        let config = MctsConfig::with_timeout(Duration::from_nanos(1));
        config.validate().unwrap();
        let mut tree = Mcts::new(&Board::new(), Player::One, config);
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(tree.run(&mut rng).unwrap() >= 1);
        assert!(tree.best_action().is_some());

        let mut rng = fastrand::Rng::with_seed(1);
        let column = search(&Board::new(), Player::One, config, &mut rng).unwrap();
        assert!(matches!(column, Some(c) if c < COLS));
    }

    #[test]
    fn test_scripted_run_builds_exact_tree() {
        // Always index 0: columns expand left to right and rollouts fill
        // the leftmost open column. Rollouts after X plays 0..=3 end in an
        // X win, after 4..=6 in an O win.
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(8));
        let mut rng = SequenceSource::new(vec![0]);
        assert_eq!(tree.run(&mut rng).unwrap(), 8);

        assert_eq!(
            tree.root_stats(),
            vec![(0, 2, 2), (1, 1, 1), (2, 1, 1), (3, 1, 1), (4, 1, 0), (5, 1, 0), (6, 1, 0)]
        );
        let root = tree.node(tree.root());
        assert_eq!((root.visits, root.wins), (8, 0));

        // The eighth iteration follows the first of the tied winners and
        // expands under it.
        let first = root.child(0).unwrap();
        let grandchild = tree.node(first).child(0).unwrap();
        assert_eq!(tree.node(first).children.len(), 1);
        assert_eq!(tree.node(grandchild).player, Player::One);
        assert_eq!((tree.node(grandchild).visits, tree.node(grandchild).wins), (1, 0));
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.best_action(), Some(0));
    }

    #[test]
    fn test_backpropagate_credits_alternate_levels() {
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(1));
        let mut rng = SequenceSource::new(vec![0]);
        let child = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let grandchild = tree.expand(child, &mut rng).unwrap().unwrap();
        tree.backpropagate(grandchild, 1);

        assert_eq!(tree.node(grandchild).visits, 1);
        assert_eq!(tree.node(child).visits, 1);
        assert_eq!(tree.node(tree.root()).visits, 1);
        // Only the node where player two is to move gets the win.
        assert_eq!(tree.node(grandchild).wins, 0);
        assert_eq!(tree.node(child).wins, 1);
        assert_eq!(tree.node(tree.root()).wins, 0);
    }

    #[test]
    fn test_uct_score() {
        let mut node = Node::new(Board::new(), Player::One, None);
        assert_eq!(node.uct_score(10, 1.0), f64::INFINITY);

        node.visits = 4;
        node.wins = 3;
        let expected = 0.75 + 0.5 * (16.0f64 / 4.0).ln().sqrt();
        assert!((node.uct_score(16, 0.5) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_best_action_prefers_first_on_ties() {
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(1));
        let mut rng = SequenceSource::new(vec![3, 0, 0]);
        let a = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let b = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let c = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        tree.nodes[a.0].visits = 2;
        tree.nodes[b.0].visits = 5;
        tree.nodes[c.0].visits = 5;

        // Expanded columns: 3, then 0, then 1.
        assert_eq!(tree.best_action(), Some(0));
    }

    #[test]
    fn test_best_child_prefers_first_on_ties() {
        let mut tree = Mcts::new(&Board::new(), Player::One, MctsConfig::with_iterations(1));
        let mut rng = SequenceSource::new(vec![6, 0]);
        let a = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        let b = tree.expand(tree.root(), &mut rng).unwrap().unwrap();
        for id in [a, b] {
            tree.nodes[id.0].visits = 1;
        }
        tree.nodes[0].visits = 2;
        assert_eq!(tree.best_child(tree.root()), Some(a));

        tree.nodes[b.0].wins = 1;
        assert_eq!(tree.best_child(tree.root()), Some(b));
    }

    #[test]
    fn test_terminal_root_has_no_action() {
        let mut b = Board::new();
        for _ in 0..4 {
            b = apply_action(&b, 0, Player::One).unwrap();
        }
        let mut rng = fastrand::Rng::with_seed(0);
        assert_eq!(search(&b, Player::Two, MctsConfig::with_iterations(5), &mut rng).unwrap(), None);
    }
}
