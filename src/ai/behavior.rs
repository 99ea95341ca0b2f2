//! Behavior Trees for NPC Decision Making
//!
//! A behavior tree is ticked once per decision step. Each tick walks the tree
//! from the root and resolves to a [`Status`]. A node that returns
//! [`Status::Running`] suspends the tree at that point; the next
//! [`BehaviorTree::execute`] resumes from the same child.
//!
//! Nodes are shared through [`NodeRef`] handles so one subtree can be
//! referenced by several composites or several trees. Execution state (the
//! composite cursors and repeat counters) lives in the shared node, so two
//! trees ticking the same subtree also share its progress.
//!
//! # Example
//!
//! ```ignore
//! let has_target = BehaviorNode::condition(move || sensor.borrow().sees_player);
//! let attack = BehaviorNode::action(|| Status::Success);
//! let patrol = BehaviorNode::action(|| Status::Running);
//!
//! let root = BehaviorNode::selector(vec![
//!     BehaviorNode::sequence(vec![has_target, attack]),
//!     patrol,
//! ]);
//!
//! let mut tree = BehaviorTree::with_root(root);
//! let status = tree.execute();
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Status
// ============================================================================

/// The result of executing a behavior node for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The node finished and achieved its goal.
    Success,
    /// The node finished without achieving its goal.
    Failure,
    /// The node has not finished yet; tick again to continue.
    Running,
}

impl Status {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// Swaps `Success` and `Failure`. `Running` is unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Shared handle to a behavior node.
pub type NodeRef = Rc<RefCell<BehaviorNode>>;

/// Callback driving an action leaf.
pub type ActionFn = Box<dyn FnMut() -> Status>;

/// Callback driving a condition leaf.
pub type ConditionFn = Box<dyn FnMut() -> bool>;

/// Ordered children plus the index of the child to tick next.
#[derive(Default)]
pub struct Composite {
    children: Vec<NodeRef>,
    cursor: usize,
}

impl Composite {
    fn new(children: Vec<NodeRef>) -> Self {
        Self { children, cursor: 0 }
    }

    /// Index of the child that will be ticked next
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn reset(&mut self) {
        self.cursor = 0;
        for child in &self.children {
            child.borrow_mut().reset();
        }
    }
}

/// Decorator that re-runs its child a fixed number of times.
pub struct Repeater {
    child: NodeRef,
    /// Zero or negative repeats forever
    max_repeats: i32,
    count: i32,
}

impl Repeater {
    /// Number of completed child runs since the last reset
    #[must_use]
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Configured repeat limit (`<= 0` means unbounded)
    #[must_use]
    pub fn max_repeats(&self) -> i32 {
        self.max_repeats
    }

    fn is_exhausted(&self) -> bool {
        self.max_repeats > 0 && self.count >= self.max_repeats
    }

    fn reset(&mut self) {
        self.count = 0;
        self.child.borrow_mut().reset();
    }
}

/// A node in a behavior tree.
///
/// The variant set is closed: composites (`Sequence`, `Selector`),
/// decorators (`Inverter`, `Repeater`) and leaves (`Action`, `Condition`).
pub enum BehaviorNode {
    /// Ticks children in order until one fails.
    Sequence(Composite),
    /// Ticks children in order until one succeeds.
    Selector(Composite),
    /// Swaps the child's `Success` and `Failure`.
    Inverter(NodeRef),
    /// Re-runs the child until the repeat limit is reached.
    Repeater(Repeater),
    /// Returns whatever the callback reports.
    Action(ActionFn),
    /// Maps the callback's `true`/`false` to `Success`/`Failure`.
    Condition(ConditionFn),
}

impl BehaviorNode {
    /// Wrap a node into a shareable handle.
    #[must_use]
    pub fn into_ref(self) -> NodeRef {
        Rc::new(RefCell::new(self))
    }

    /// Create a sequence over `children`.
    #[must_use]
    pub fn sequence(children: Vec<NodeRef>) -> NodeRef {
        BehaviorNode::Sequence(Composite::new(children)).into_ref()
    }

    /// Create a selector over `children`.
    #[must_use]
    pub fn selector(children: Vec<NodeRef>) -> NodeRef {
        BehaviorNode::Selector(Composite::new(children)).into_ref()
    }

    /// Create an inverter around `child`.
    #[must_use]
    pub fn inverter(child: NodeRef) -> NodeRef {
        BehaviorNode::Inverter(child).into_ref()
    }

    /// Create a repeater around `child`. `max_repeats <= 0` repeats forever.
    #[must_use]
    pub fn repeater(child: NodeRef, max_repeats: i32) -> NodeRef {
        BehaviorNode::Repeater(Repeater {
            child,
            max_repeats,
            count: 0,
        })
        .into_ref()
    }

    /// Create an action leaf.
    #[must_use]
    pub fn action(action: impl FnMut() -> Status + 'static) -> NodeRef {
        BehaviorNode::Action(Box::new(action)).into_ref()
    }

    /// Create a condition leaf.
    #[must_use]
    pub fn condition(condition: impl FnMut() -> bool + 'static) -> NodeRef {
        BehaviorNode::Condition(Box::new(condition)).into_ref()
    }

    /// Append a child to a composite node.
    ///
    /// Returns `false` (and leaves the node untouched) for decorators and leaves.
    pub fn add_child(&mut self, child: NodeRef) -> bool {
        match self {
            BehaviorNode::Sequence(composite) | BehaviorNode::Selector(composite) => {
                composite.children.push(child);
                true
            }
            _ => {
                log::warn!("add_child called on a {} node", self.kind());
                false
            }
        }
    }

    /// Node kind name for debugging and logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BehaviorNode::Sequence(_) => "Sequence",
            BehaviorNode::Selector(_) => "Selector",
            BehaviorNode::Inverter(_) => "Inverter",
            BehaviorNode::Repeater(_) => "Repeater",
            BehaviorNode::Action(_) => "Action",
            BehaviorNode::Condition(_) => "Condition",
        }
    }

    /// Advance this node by one step.
    pub fn execute(&mut self) -> Status {
        match self {
            BehaviorNode::Sequence(composite) => {
                while composite.cursor < composite.children.len() {
                    let status = composite.children[composite.cursor].borrow_mut().execute();
                    match status {
                        Status::Success => composite.cursor += 1,
                        Status::Failure => {
                            composite.reset();
                            return Status::Failure;
                        }
                        Status::Running => return Status::Running,
                    }
                }
                composite.reset();
                Status::Success
            }

            BehaviorNode::Selector(composite) => {
                while composite.cursor < composite.children.len() {
                    let status = composite.children[composite.cursor].borrow_mut().execute();
                    match status {
                        Status::Failure => composite.cursor += 1,
                        Status::Success => {
                            composite.reset();
                            return Status::Success;
                        }
                        Status::Running => return Status::Running,
                    }
                }
                composite.reset();
                Status::Failure
            }

            BehaviorNode::Inverter(child) => child.borrow_mut().execute().invert(),

            BehaviorNode::Repeater(repeater) => {
                if repeater.is_exhausted() {
                    repeater.reset();
                    return Status::Success;
                }

                let status = repeater.child.borrow_mut().execute();
                if status.is_running() {
                    return Status::Running;
                }

                repeater.count += 1;
                repeater.child.borrow_mut().reset();

                if repeater.is_exhausted() {
                    repeater.reset();
                    return Status::Success;
                }
                Status::Running
            }

            BehaviorNode::Action(action) => action(),

            BehaviorNode::Condition(condition) => {
                if condition() {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
        }
    }

    /// Return this node and all of its descendants to their initial state.
    ///
    /// Leaves carry no state; callbacks are never invoked by a reset.
    pub fn reset(&mut self) {
        match self {
            BehaviorNode::Sequence(composite) | BehaviorNode::Selector(composite) => {
                composite.reset();
            }
            BehaviorNode::Inverter(child) => child.borrow_mut().reset(),
            BehaviorNode::Repeater(repeater) => repeater.reset(),
            BehaviorNode::Action(_) | BehaviorNode::Condition(_) => {}
        }
    }
}

impl fmt::Debug for BehaviorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BehaviorNode::Sequence(c) | BehaviorNode::Selector(c) => f
                .debug_struct(self.kind())
                .field("children", &c.children.len())
                .field("cursor", &c.cursor)
                .finish(),
            BehaviorNode::Repeater(r) => f
                .debug_struct("Repeater")
                .field("max_repeats", &r.max_repeats)
                .field("count", &r.count)
                .finish(),
            _ => write!(f, "{}", self.kind()),
        }
    }
}

// ============================================================================
// Behavior Tree
// ============================================================================

/// A behavior tree owning (a share of) its root node.
///
/// Trees start empty. Executing an empty tree returns `Failure`.
#[derive(Default)]
pub struct BehaviorTree {
    root: Option<NodeRef>,
}

impl BehaviorTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree with the given root.
    #[must_use]
    pub fn with_root(root: NodeRef) -> Self {
        Self { root: Some(root) }
    }

    /// Replace the root node.
    pub fn set_root(&mut self, root: NodeRef) {
        self.root = Some(root);
    }

    /// The current root, if any.
    #[must_use]
    pub fn root(&self) -> Option<&NodeRef> {
        self.root.as_ref()
    }

    /// Advance the tree by one step.
    pub fn execute(&mut self) -> Status {
        match &self.root {
            Some(root) => root.borrow_mut().execute(),
            None => Status::Failure,
        }
    }

    /// Return every node to its initial state.
    pub fn reset(&mut self) {
        if let Some(root) = &self.root {
            root.borrow_mut().reset();
        }
    }
}

impl fmt::Debug for BehaviorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("root", &self.root.as_ref().map(|r| r.borrow().kind()))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Action that counts its invocations and returns a fixed status.
    fn counted(status: Status) -> (NodeRef, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let node = BehaviorNode::action(move || {
            counter.set(counter.get() + 1);
            status
        });
        (node, calls)
    }

    /// Action that replays a scripted list of statuses, then keeps returning the last one.
    fn scripted(script: Vec<Status>) -> NodeRef {
        let mut step = 0;
        BehaviorNode::action(move || {
            let status = script[step.min(script.len() - 1)];
            step += 1;
            status
        })
    }

    #[test]
    fn test_status_invert() {
        assert_eq!(Status::Success.invert(), Status::Failure);
        assert_eq!(Status::Failure.invert(), Status::Success);
        assert_eq!(Status::Running.invert(), Status::Running);
    }

    #[test]
    fn test_sequence_failure_resets_cursor() {
        let (first, first_calls) = counted(Status::Success);
        let (second, _) = counted(Status::Success);
        let (third, third_calls) = counted(Status::Failure);
        let (fourth, fourth_calls) = counted(Status::Success);

        let mut tree = BehaviorTree::with_root(BehaviorNode::sequence(vec![
            first, second, third, fourth,
        ]));

        assert_eq!(tree.execute(), Status::Failure);
        assert_eq!(first_calls.get(), 1);
        assert_eq!(third_calls.get(), 1);
        assert_eq!(fourth_calls.get(), 0);

        // Cursor went back to 0, so node 0 runs again
        assert_eq!(tree.execute(), Status::Failure);
        assert_eq!(first_calls.get(), 2);
    }

    #[test]
    fn test_sequence_running_resumes_same_child() {
        let (first, first_calls) = counted(Status::Success);
        let second = scripted(vec![Status::Running, Status::Running, Status::Success]);
        let (third, third_calls) = counted(Status::Success);

        let root = BehaviorNode::sequence(vec![first, second, third]);
        let mut tree = BehaviorTree::with_root(Rc::clone(&root));

        assert_eq!(tree.execute(), Status::Running);
        if let BehaviorNode::Sequence(c) = &*root.borrow() {
            assert_eq!(c.cursor(), 1);
        }
        assert_eq!(tree.execute(), Status::Running);
        assert_eq!(tree.execute(), Status::Success);

        // The first child was not re-run while suspended
        assert_eq!(first_calls.get(), 1);
        assert_eq!(third_calls.get(), 1);
    }

    #[test]
    fn test_empty_composites() {
        let mut sequence = BehaviorTree::with_root(BehaviorNode::sequence(Vec::new()));
        let mut selector = BehaviorTree::with_root(BehaviorNode::selector(Vec::new()));

        assert_eq!(sequence.execute(), Status::Success);
        assert_eq!(selector.execute(), Status::Failure);
    }

    #[test]
    fn test_selector_short_circuit() {
        let (first, first_calls) = counted(Status::Failure);
        let (second, second_calls) = counted(Status::Success);
        let (third, third_calls) = counted(Status::Success);

        let mut tree = BehaviorTree::with_root(BehaviorNode::selector(vec![first, second, third]));

        assert_eq!(tree.execute(), Status::Success);
        assert_eq!(first_calls.get(), 1);
        assert_eq!(second_calls.get(), 1);
        assert_eq!(third_calls.get(), 0);
    }

    #[test]
    fn test_selector_running_does_not_advance() {
        let (first, first_calls) = counted(Status::Failure);
        let second = scripted(vec![Status::Running, Status::Failure]);
        let (third, third_calls) = counted(Status::Failure);

        let mut tree = BehaviorTree::with_root(BehaviorNode::selector(vec![first, second, third]));

        assert_eq!(tree.execute(), Status::Running);
        assert_eq!(third_calls.get(), 0);
        assert_eq!(tree.execute(), Status::Failure);
        assert_eq!(first_calls.get(), 1);
        assert_eq!(third_calls.get(), 1);
    }

    #[test]
    fn test_inverter() {
        let mut success = BehaviorTree::with_root(BehaviorNode::inverter(BehaviorNode::action(
            || Status::Success,
        )));
        let mut running = BehaviorTree::with_root(BehaviorNode::inverter(BehaviorNode::action(
            || Status::Running,
        )));

        assert_eq!(success.execute(), Status::Failure);
        assert_eq!(running.execute(), Status::Running);
    }

    #[test]
    fn test_double_inverter_matches_leaf() {
        let script = vec![
            Status::Success,
            Status::Running,
            Status::Failure,
            Status::Failure,
            Status::Success,
        ];

        let mut plain = BehaviorTree::with_root(scripted(script.clone()));
        let mut doubled = BehaviorTree::with_root(BehaviorNode::inverter(BehaviorNode::inverter(
            scripted(script.clone()),
        )));

        for _ in 0..script.len() {
            assert_eq!(plain.execute(), doubled.execute());
        }
    }

    #[test]
    fn test_condition() {
        let flag = Rc::new(Cell::new(true));
        let seen = Rc::clone(&flag);
        let mut tree = BehaviorTree::with_root(BehaviorNode::condition(move || seen.get()));

        assert_eq!(tree.execute(), Status::Success);
        flag.set(false);
        assert_eq!(tree.execute(), Status::Failure);
    }

    #[test]
    fn test_repeater_counts_runs() {
        let (child, calls) = counted(Status::Failure);
        let mut tree = BehaviorTree::with_root(BehaviorNode::repeater(child, 3));

        assert_eq!(tree.execute(), Status::Running);
        assert_eq!(tree.execute(), Status::Running);
        assert_eq!(tree.execute(), Status::Success);
        assert_eq!(calls.get(), 3);

        // Reset itself after finishing, so it starts over
        assert_eq!(tree.execute(), Status::Running);
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_repeater_waits_for_running_child() {
        let child = scripted(vec![Status::Running, Status::Success]);
        let root = BehaviorNode::repeater(child, 1);
        let mut tree = BehaviorTree::with_root(Rc::clone(&root));

        assert_eq!(tree.execute(), Status::Running);
        if let BehaviorNode::Repeater(r) = &*root.borrow() {
            assert_eq!(r.count(), 0);
        }
        assert_eq!(tree.execute(), Status::Success);
    }

    #[test]
    fn test_repeater_unbounded() {
        let (child, calls) = counted(Status::Success);
        let mut tree = BehaviorTree::with_root(BehaviorNode::repeater(child, 0));

        for _ in 0..50 {
            assert_eq!(tree.execute(), Status::Running);
        }
        assert_eq!(calls.get(), 50);
    }

    #[test]
    fn test_repeater_exhausted_skips_child() {
        let (child, calls) = counted(Status::Success);
        let root = BehaviorNode::repeater(child, 2);

        if let BehaviorNode::Repeater(r) = &mut *root.borrow_mut() {
            r.count = 2;
        }

        let mut tree = BehaviorTree::with_root(root);
        assert_eq!(tree.execute(), Status::Success);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_reset_matches_fresh_tree() {
        fn build() -> NodeRef {
            BehaviorNode::sequence(vec![
                BehaviorNode::action(|| Status::Success),
                BehaviorNode::repeater(BehaviorNode::action(|| Status::Success), 2),
                BehaviorNode::selector(vec![
                    BehaviorNode::condition(|| false),
                    BehaviorNode::action(|| Status::Success),
                ]),
            ])
        }

        let mut fresh = BehaviorTree::with_root(build());
        let mut used = BehaviorTree::with_root(build());

        // Leave `used` suspended inside the repeater
        assert_eq!(used.execute(), Status::Running);
        used.reset();

        for _ in 0..4 {
            assert_eq!(used.execute(), fresh.execute());
        }
    }

    #[test]
    fn test_empty_tree_fails() {
        let mut tree = BehaviorTree::new();
        assert!(tree.root().is_none());
        assert_eq!(tree.execute(), Status::Failure);
        tree.reset();
    }

    #[test]
    fn test_shared_subtree() {
        let (leaf, calls) = counted(Status::Success);
        let mut a = BehaviorTree::with_root(BehaviorNode::sequence(vec![Rc::clone(&leaf)]));
        let mut b = BehaviorTree::with_root(BehaviorNode::inverter(Rc::clone(&leaf)));

        assert_eq!(a.execute(), Status::Success);
        assert_eq!(b.execute(), Status::Failure);
        assert_eq!(calls.get(), 2);
        assert_eq!(Rc::strong_count(&leaf), 3);
    }

    #[test]
    fn test_add_child() {
        let root = BehaviorNode::sequence(Vec::new());
        assert!(root.borrow_mut().add_child(BehaviorNode::action(|| Status::Failure)));

        let leaf = BehaviorNode::action(|| Status::Success);
        assert!(!leaf.borrow_mut().add_child(BehaviorNode::action(|| Status::Success)));

        let mut tree = BehaviorTree::with_root(root);
        assert_eq!(tree.execute(), Status::Failure);
    }
}
