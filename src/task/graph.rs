//! Declarative task graph.
//!
//! Nodes are [`Task`]s, edges are "must finish before" constraints. The
//! runner executes [`TaskGraph::phases`]: every task of a phase runs in
//! parallel, phases run in order.
//!
//! ```text
//! build:          clean → [html css js images fonts]
//! build (hash):   clean → [css js images fonts] → [html]
//! dev:            build → [watch serve]
//! ```

use super::Task;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGraph {
    nodes: Vec<Task>,
    /// `(before, after)` pairs.
    edges: Vec<(Task, Task)>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add a task (idempotent).
    pub fn add(&mut self, task: Task) -> &mut Self {
        if !self.nodes.contains(&task) {
            self.nodes.push(task);
        }
        self
    }

    /// Declare that `before` must finish before `after` starts.
    pub fn depends_on(&mut self, after: Task, before: Task) -> &mut Self {
        self.add(before).add(after);
        if !self.edges.contains(&(before, after)) {
            self.edges.push((before, after));
        }
        self
    }

    /// A graph with a single task.
    pub fn single(task: Task) -> Self {
        let mut graph = Self::new();
        graph.add(task);
        graph
    }

    /// `clean` then every transform; with hashing, html after css and js.
    pub fn build(hashing: bool) -> Self {
        let mut graph = Self::new();
        graph.add(Task::Clean);
        for task in Task::TRANSFORMS {
            graph.depends_on(task, Task::Clean);
        }
        if hashing {
            graph
                .depends_on(Task::Html, Task::Css)
                .depends_on(Task::Html, Task::Js);
        }
        graph
    }

    /// The build graph followed by `watch` and `serve`.
    pub fn dev(hashing: bool, watch: bool) -> Self {
        let mut graph = Self::build(hashing);
        let mut after: Vec<Task> = vec![Task::Serve];
        if watch {
            after.push(Task::Watch);
        }
        for task in after {
            for transform in Task::TRANSFORMS {
                graph.depends_on(task, transform);
            }
        }
        graph
    }

    /// Graph for rerunning `tasks` after a source change.
    ///
    /// With hashing, a css or js rerun also reruns html, after them.
    pub fn rerun(tasks: &[Task], hashing: bool) -> Self {
        let mut graph = Self::new();
        for &task in tasks {
            graph.add(task);
        }
        if hashing {
            for dep in [Task::Css, Task::Js] {
                if graph.contains(dep) {
                    graph.depends_on(Task::Html, dep);
                }
            }
        }
        graph
    }

    pub fn contains(&self, task: Task) -> bool {
        self.nodes.contains(&task)
    }

    /// Whether `before` must (transitively) finish before `after`.
    pub fn must_precede(&self, before: Task, after: Task) -> bool {
        let mut stack = vec![before];
        let mut seen = Vec::new();
        while let Some(task) = stack.pop() {
            for &(from, to) in &self.edges {
                if from == task && !seen.contains(&to) {
                    if to == after {
                        return true;
                    }
                    seen.push(to);
                    stack.push(to);
                }
            }
        }
        false
    }

    /// Layered topological order.
    ///
    /// A task lands in the first phase after all of its dependencies. Within
    /// a phase tasks keep [`Task`] declaration order.
    pub fn phases(&self) -> Vec<Vec<Task>> {
        let mut remaining: Vec<Task> = self.nodes.clone();
        remaining.sort();
        let mut done: Vec<Task> = Vec::new();
        let mut phases = Vec::new();

        while !remaining.is_empty() {
            let ready: Vec<Task> = remaining
                .iter()
                .copied()
                .filter(|&task| {
                    self.edges
                        .iter()
                        .filter(|&&(_, to)| to == task)
                        .all(|(from, _)| done.contains(from))
                })
                .collect();

            // Edges are only added by the constructors above, which never form cycles
            if ready.is_empty() {
                break;
            }

            remaining.retain(|task| !ready.contains(task));
            done.extend(&ready);
            phases.push(ready);
        }
        phases
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Task::*;

    #[test]
    fn test_build_phases() {
        assert_eq!(
            TaskGraph::build(false).phases(),
            vec![vec![Clean], vec![Html, Css, Js, Images, Fonts]]
        );
    }

    #[test]
    fn test_hashing_build_runs_html_last() {
        let graph = TaskGraph::build(true);
        assert_eq!(
            graph.phases(),
            vec![vec![Clean], vec![Css, Js, Images, Fonts], vec![Html]]
        );
        assert!(graph.must_precede(Css, Html));
        assert!(graph.must_precede(Js, Html));
        assert!(!graph.must_precede(Images, Html));
    }

    #[test]
    fn test_clean_precedes_every_transform() {
        let graph = TaskGraph::build(true);
        for task in Task::TRANSFORMS {
            assert!(graph.must_precede(Clean, task));
        }
    }

    #[test]
    fn test_dev_graph() {
        let graph = TaskGraph::dev(false, true);
        let phases = graph.phases();
        assert_eq!(phases.last(), Some(&vec![Watch, Serve]));
        assert!(graph.must_precede(Clean, Serve));

        let graph = TaskGraph::dev(true, false);
        assert!(!graph.contains(Watch));
        assert_eq!(graph.phases().last(), Some(&vec![Serve]));
        assert!(graph.must_precede(Html, Serve));
    }

    #[test]
    fn test_rerun_adds_html_when_hashing() {
        assert_eq!(
            TaskGraph::rerun(&[Css], true).phases(),
            vec![vec![Css], vec![Html]]
        );
        assert_eq!(TaskGraph::rerun(&[Css], false).phases(), vec![vec![Css]]);
        assert_eq!(
            TaskGraph::rerun(&[Images, Js], true).phases(),
            vec![vec![Js, Images], vec![Html]]
        );
    }

    #[test]
    fn test_single() {
        assert_eq!(TaskGraph::single(Css).phases(), vec![vec![Css]]);
    }
}
