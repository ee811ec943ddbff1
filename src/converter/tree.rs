//! Session-scoped registry of suites, groups and tests.

use crate::protocol::event::{GroupInfo, Location, SuiteInfo, TestInfo};
use std::collections::HashMap;

pub const LOADING_PREFIX: &str = "loading ";
pub const COMPILING_PREFIX: &str = "compiling ";
pub const SET_UP_ALL: &str = "(setUpAll)";
pub const TEAR_DOWN_ALL: &str = "(tearDownAll)";

const LOCATION_PREFIX: &str = "dart_location://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Known but not announced yet.
    Registered,
    Running,
    Passed,
    Failed,
    Broken,
    Skipped,
}

impl NodeStatus {
    pub fn is_reported(self) -> bool {
        self != NodeStatus::Registered
    }

    pub fn is_terminal(self) -> bool {
        match self {
            NodeStatus::Registered | NodeStatus::Running => false,
            NodeStatus::Passed | NodeStatus::Failed | NodeStatus::Broken | NodeStatus::Skipped => {
                true
            }
        }
    }
}

#[derive(Debug)]
pub struct Suite {
    pub id: u64,
    pub path: Option<String>,
}

#[derive(Debug)]
pub struct Group {
    pub id: u64,
    pub suite_id: Option<u64>,
    pub parent_id: Option<u64>,
    pub name: Option<String>,
    /// `None` for groups that are never shown.
    pub display_name: Option<String>,
    pub test_count: Option<u32>,
    pub done_count: u32,
    pub started: bool,
    pub finished: bool,
    pub location: Location,
}

impl Group {
    pub fn is_artificial(&self) -> bool {
        self.display_name.is_none()
    }

    fn is_complete(&self) -> bool {
        match self.test_count {
            Some(count) if count > 0 => self.done_count >= count,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct TestNode {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub suite_id: Option<u64>,
    pub group_ids: Vec<u64>,
    pub start_time: Option<u64>,
    pub skip: bool,
    pub skip_reason: Option<String>,
    /// Loading, compiling, setUpAll and tearDownAll pseudo tests.
    pub hidden_if_passed: bool,
    pub status: NodeStatus,
    pub location: Location,
}

impl TestNode {
    pub fn is_loading(&self) -> bool {
        self.group_ids.is_empty()
            && (self.name.starts_with(LOADING_PREFIX) || self.name.starts_with(COMPILING_PREFIX))
    }
}

#[derive(Debug, Default)]
pub struct TestTree {
    suites: HashMap<u64, Suite>,
    groups: HashMap<u64, Group>,
    tests: HashMap<u64, TestNode>,
    named: HashMap<String, u64>,
    open_groups: Vec<u64>,
    next_id: u64,
}

impl TestTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_suite(&mut self, info: SuiteInfo) {
        self.suites.insert(
            info.id,
            Suite {
                id: info.id,
                path: info.path,
            },
        );
    }

    pub fn add_group(&mut self, info: GroupInfo) -> &Group {
        let parent_name = info
            .parent_id
            .and_then(|id| self.groups.get(&id))
            .and_then(|group| group.name.as_deref());
        let display_name = match info.name.as_deref() {
            Some(name) if !name.is_empty() => Some(strip_group_prefix(name, parent_name)),
            _ if info.parent_id.is_none() => self.suite_path(info.suite_id).map(file_name),
            _ => None,
        };
        self.see_id(info.id);
        let group = Group {
            id: info.id,
            suite_id: info.suite_id,
            parent_id: info.parent_id,
            name: info.name,
            display_name,
            test_count: info.test_count,
            done_count: 0,
            started: false,
            finished: false,
            location: info.location,
        };
        self.groups.entry(info.id).or_insert(group)
    }

    pub fn add_test(&mut self, info: TestInfo) -> &TestNode {
        let group_name = info
            .group_ids
            .iter()
            .rev()
            .filter_map(|id| self.groups.get(id))
            .find_map(|group| group.name.as_deref());
        let display_name = match loading_name(&info.name) {
            Some(display) if info.group_ids.is_empty() => display,
            _ => strip_group_prefix(&info.name, group_name),
        };
        self.see_id(info.id);
        let mut node = TestNode {
            id: info.id,
            name: info.name,
            display_name,
            suite_id: info.suite_id,
            group_ids: info.group_ids,
            start_time: info.time,
            skip: info.skip,
            skip_reason: info.skip_reason,
            hidden_if_passed: false,
            status: NodeStatus::Registered,
            location: info.location,
        };
        node.hidden_if_passed = node.is_loading()
            || node.display_name == SET_UP_ALL
            || node.display_name == TEAR_DOWN_ALL;
        self.tests.insert(node.id, node);
        &self.tests[&info.id]
    }

    /// Registers a test known only by its name, under the session root.
    pub fn add_named(&mut self, name: &str, time: Option<u64>) -> u64 {
        let id = self.next_id;
        self.see_id(id);
        self.named.insert(name.to_owned(), id);
        self.tests.insert(
            id,
            TestNode {
                id,
                name: name.to_owned(),
                display_name: name.to_owned(),
                suite_id: None,
                group_ids: vec![],
                start_time: time,
                skip: false,
                skip_reason: None,
                hidden_if_passed: false,
                status: NodeStatus::Registered,
                location: Location::default(),
            },
        );
        id
    }

    pub fn named_id(&self, name: &str) -> Option<u64> {
        self.named.get(name).copied()
    }

    pub fn test(&self, id: u64) -> Option<&TestNode> {
        self.tests.get(&id)
    }

    pub fn test_mut(&mut self, id: u64) -> Option<&mut TestNode> {
        self.tests.get_mut(&id)
    }

    pub fn group(&self, id: u64) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Innermost shown group of a test; unknown groups resolve to the root.
    pub fn test_parent(&self, node: &TestNode) -> Option<u64> {
        node.group_ids
            .iter()
            .rev()
            .copied()
            .find(|id| self.groups.get(id).map_or(false, |group| !group.is_artificial()))
    }

    pub fn group_parent(&self, group: &Group) -> Option<u64> {
        let mut parent_id = group.parent_id;
        while let Some(id) = parent_id {
            match self.groups.get(&id) {
                Some(parent) if !parent.is_artificial() => return Some(id),
                Some(parent) => parent_id = parent.parent_id,
                None => return None,
            }
        }
        None
    }

    /// Shown groups from the outermost down to `group_id` that were not
    /// announced yet.
    pub fn unstarted_chain(&self, group_id: u64) -> Vec<u64> {
        let mut chain = vec![];
        for group in self.ancestry(Some(group_id)) {
            if !group.is_artificial() && !group.started {
                chain.push(group.id);
            }
        }
        chain.reverse();
        chain
    }

    pub fn mark_group_started(&mut self, id: u64) {
        if let Some(group) = self.groups.get_mut(&id) {
            group.started = true;
            self.open_groups.push(id);
        }
    }

    /// Counts a finished test towards its groups and returns the groups it
    /// completed, innermost first.
    pub fn complete_test(&mut self, test_id: u64) -> Vec<u64> {
        let group_ids = match self.tests.get(&test_id) {
            Some(node) if !node.hidden_if_passed => node.group_ids.clone(),
            _ => return vec![],
        };
        let mut completed = vec![];
        for id in group_ids.iter().rev() {
            if let Some(group) = self.groups.get_mut(id) {
                group.done_count += 1;
                if group.started && !group.finished && group.is_complete() {
                    completed.push(*id);
                }
            }
        }
        for id in &completed {
            self.finish_group(*id);
        }
        completed
    }

    /// Closes every group still open, most recently started first.
    pub fn close_open_groups(&mut self) -> Vec<u64> {
        let open: Vec<u64> = self.open_groups.iter().rev().copied().collect();
        for id in &open {
            self.finish_group(*id);
        }
        open
    }

    fn finish_group(&mut self, id: u64) {
        if let Some(group) = self.groups.get_mut(&id) {
            group.finished = true;
        }
        self.open_groups.retain(|open| *open != id);
    }

    pub fn suite_path(&self, suite_id: Option<u64>) -> Option<&str> {
        suite_id
            .and_then(|id| self.suites.get(&id))
            .and_then(|suite| suite.path.as_deref())
    }

    /// `dart_location://<path>,["group","test"]` for a node under a known suite.
    /// The root group of a suite has no name of its own in the list.
    pub fn location_hint(
        &self,
        suite_id: Option<u64>,
        parent_id: Option<u64>,
        name: Option<&str>,
    ) -> Option<String> {
        let path = self.suite_path(suite_id)?;
        let mut names: Vec<String> = self
            .ancestry(parent_id)
            .into_iter()
            .filter(|group| group.parent_id.is_some())
            .filter_map(|group| group.display_name.clone())
            .collect();
        names.reverse();
        if let Some(name) = name {
            names.push(name.to_owned());
        }
        let names = serde_json::to_string(&names).ok()?;
        Some(format!("{}{},{}", LOCATION_PREFIX, path, names))
    }

    /// Known groups from `group_id` up to its root, innermost first.
    fn ancestry(&self, group_id: Option<u64>) -> Vec<&Group> {
        let mut groups = vec![];
        let mut next = group_id;
        while let Some(group) = next.and_then(|id| self.groups.get(&id)) {
            if groups.len() > self.groups.len() {
                warn!("Group {} has a cyclic parent chain", group.id);
                break;
            }
            groups.push(group);
            next = group.parent_id;
        }
        groups
    }

    fn see_id(&mut self, id: u64) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }
}

/// `line,column` of a declaration, when the runner reported it.
pub fn node_args(location: &Location) -> Option<String> {
    match (location.line, location.column) {
        (Some(line), Some(column)) => Some(format!("{},{}", line, column)),
        _ => None,
    }
}

fn strip_group_prefix(name: &str, group_name: Option<&str>) -> String {
    if let Some(group_name) = group_name {
        if let Some(rest) = name.strip_prefix(group_name) {
            if let Some(rest) = rest.strip_prefix(' ') {
                if !rest.is_empty() {
                    return rest.to_owned();
                }
            }
        }
    }
    name.to_owned()
}

fn loading_name(name: &str) -> Option<String> {
    for prefix in [LOADING_PREFIX, COMPILING_PREFIX].iter() {
        if let Some(path) = name.strip_prefix(prefix) {
            return Some(format!("{}{}", prefix, file_name(path)));
        }
    }
    None
}

fn file_name(path: &str) -> String {
    path.rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(path)
        .to_owned()
}
