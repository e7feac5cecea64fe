//! Event correlation of synthesized hardware printfs.
//!
//! The accelerator prints an event for each pipeline step, tagged with its
//! own event id, its parent's event id and the cycle it happened in. Events
//! with the same id repeat, so each occurrence is matched with the oldest
//! still-pending occurrence of its parent id, building one tree per
//! compressed file. Latencies are then measured along the tree edges.

// Imports
use {
	average::{Estimate, Mean},
	cdpustat_util::TokenSlice,
	std::{
		collections::{BTreeMap, HashMap, VecDeque},
		fmt,
	},
};

/// Marker of lines starting a new file (and a new graph)
pub const ROOT_MARKER: &str = "FHDR_WRITE";

/// Marker of event lines
pub const EVENT_MARKER: &str = "CYCLE:";

/// Name of the only events accepted as children of the root
pub const DEFAULT_ROOT_CHILD: &str = "LZ77Fire";

/// Event
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Event {
	/// Name
	pub name: String,

	/// Cycle
	pub cycle: u64,

	/// Event id
	pub event_id: u64,

	/// Parent event id
	pub parent_id: u64,
}

impl Event {
	/// Parses an event line.
	///
	/// Quotes and commas are ignored and the first two tokens (the
	/// printf prefix) are skipped. Of the rest, token 1 is the event id,
	/// 3 the parent id, 5 the cycle and 7 the name.
	pub fn parse(line: &str) -> Option<Self> {
		let line = line.replace("\\\"", "").replace(',', "");
		let tokens = line.split_whitespace().skip(2).collect::<Vec<_>>();

		Some(Self {
			name:      tokens.get(7)?.to_string(),
			cycle:     tokens.get(5)?.parse().ok()?,
			event_id:  tokens.get(1)?.parse().ok()?,
			parent_id: tokens.get(3)?.parse().ok()?,
		})
	}
}

impl fmt::Display for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {} {} {}", self.name, self.cycle, self.event_id, self.parent_id)
	}
}

/// Node index within a graph
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NodeIdx(usize);

/// Outcome of [`EventGraph::add_event`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AddOutcome {
	/// Event was linked to its parent
	Linked(NodeIdx),

	/// Event was recorded, but no occurrence of its parent was pending
	Unlinked(NodeIdx),

	/// Event's parent id was never seen, event was dropped
	UnknownParent,

	/// Event was a child of the root with a filtered name, event was dropped
	Filtered,
}

/// Event graph of a single file
#[derive(Clone, Debug)]
pub struct EventGraph {
	/// All nodes
	nodes: Vec<Event>,

	/// Children of each node
	children: HashMap<NodeIdx, Vec<NodeIdx>>,

	/// Pending occurrences of each event id, oldest first.
	///
	/// The root occurrence is never dequeued.
	pending: HashMap<u64, VecDeque<NodeIdx>>,

	/// Root node
	root: NodeIdx,

	/// Only accepted name of the root's children
	root_child: String,
}

impl EventGraph {
	/// Creates a graph from its root event
	pub fn new(root: Event) -> Self {
		Self::with_root_child(root, DEFAULT_ROOT_CHILD)
	}

	/// Creates a graph from its root event, accepting only `root_child` events as children of the root
	pub fn with_root_child(root: Event, root_child: impl Into<String>) -> Self {
		let root_idx = NodeIdx(0);
		let pending = HashMap::from([(root.event_id, VecDeque::from([root_idx]))]);

		Self {
			nodes: vec![root],
			children: HashMap::new(),
			pending,
			root: root_idx,
			root_child: root_child.into(),
		}
	}

	/// Returns the root event
	pub fn root(&self) -> &Event {
		&self.nodes[self.root.0]
	}

	/// Returns a node's event
	pub fn event(&self, idx: NodeIdx) -> &Event {
		&self.nodes[idx.0]
	}

	/// Returns a node's children
	pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
		self.children.get(&idx).map_or(&[], Vec::as_slice)
	}

	/// Returns the number of events in the graph, including the root
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Returns if the graph only has its root
	pub fn is_empty(&self) -> bool {
		self.nodes.len() == 1
	}

	/// Adds an event to the graph
	pub fn add_event(&mut self, event: Event) -> AddOutcome {
		let parent_id = event.parent_id;
		let root_id = self.root().event_id;

		// Note: An event whose parent was never seen can't be placed anywhere in the tree.
		if !self.pending.contains_key(&parent_id) {
			return AddOutcome::UnknownParent;
		}
		if parent_id == root_id && event.name != self.root_child {
			return AddOutcome::Filtered;
		}

		// Record the event as a pending occurrence of its own id
		let idx = NodeIdx(self.nodes.len());
		let event_id = event.event_id;
		self.nodes.push(event);
		self.pending.entry(event_id).or_default().push_back(idx);

		// Then link it to the oldest pending occurrence of its parent
		let Some(parent_queue) = self.pending.get_mut(&parent_id) else {
			return AddOutcome::Unlinked(idx);
		};
		let Some(&parent_idx) = parent_queue.front() else {
			return AddOutcome::Unlinked(idx);
		};
		if parent_idx != self.root {
			parent_queue.pop_front();
		}
		self.children.entry(parent_idx).or_default().push(idx);

		AddOutcome::Linked(idx)
	}

	/// Collects the latency of every edge, by child name.
	///
	/// The walk starts at the root's first child, so the edges from the root
	/// itself aren't measured.
	pub fn latencies(&self) -> BTreeMap<String, Vec<i64>> {
		let mut latencies = BTreeMap::<_, Vec<_>>::new();
		let Some(&start) = self.children(self.root).first() else {
			return latencies;
		};

		let mut stack = vec![start];
		while let Some(idx) = stack.pop() {
			let event = self.event(idx);
			for &child_idx in self.children(idx) {
				let child = self.event(child_idx);
				latencies
					.entry(child.name.clone())
					.or_default()
					.push(child.cycle as i64 - event.cycle as i64);
				stack.push(child_idx);
			}
		}

		latencies
	}
}

/// Sweep configuration of a benchmark iteration
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct SweepConfig {
	pub hist_sram: u64,
	pub log2_ht:   u32,
	pub latency:   u32,
	pub has_cache: bool,
}

impl Default for SweepConfig {
	fn default() -> Self {
		Self {
			hist_sram: 65536,
			log2_ht:   14,
			latency:   1,
			has_cache: false,
		}
	}
}

impl fmt::Display for SweepConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"histSRAM-{}-log2HTSize-{}-latency-{}-hascache-{}",
			self.hist_sram, self.log2_ht, self.latency, self.has_cache
		)
	}
}

/// Benchmark information, from the `uartlog` of the run
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct BenchmarkInfo {
	/// Files compressed per sweep configuration
	pub files_per_iter: usize,

	/// Sweep configurations, in run order
	pub sweep_configs: Vec<SweepConfig>,
}

impl BenchmarkInfo {
	/// Parses the benchmark information from `uartlog` lines
	pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
		let mut total_files = 0;
		let mut sweep_configs = vec![];
		for line in lines {
			let tokens = line.split_whitespace().collect::<Vec<_>>();
			match tokens.as_slice() {
				["Start", "cycle:", _, ..] => total_files += 1,
				["TOTAL:", ..] if tokens.len() > 25 => match Self::parse_sweep_config(&tokens) {
					Some(config) => sweep_configs.push(config),
					None => tracing::warn!(?line, "Skipping malformed summary line"),
				},
				_ => (),
			}
		}

		match sweep_configs.len() {
			0 => Self {
				files_per_iter: 1,
				sweep_configs:  vec![SweepConfig::default()],
			},
			len => Self {
				files_per_iter: total_files / len,
				sweep_configs,
			},
		}
	}

	fn parse_sweep_config(tokens: &[&str]) -> Option<SweepConfig> {
		Some(SweepConfig {
			hist_sram: tokens.value_after("histsram")?.parse().ok()?,
			log2_ht:   tokens.value_after("log2HTSize")?.parse().ok()?,
			latency:   tokens.value_after("latency")?.parse().ok()?,
			has_cache: tokens.value_after("hasCache")?.parse::<u32>().ok()? != 0,
		})
	}

	/// Returns the iteration the `file_idx`-th file was compressed in
	pub fn iteration_of(&self, file_idx: usize) -> Option<usize> {
		let iteration = file_idx / self.files_per_iter.max(1);
		(iteration < self.sweep_configs.len()).then_some(iteration)
	}

	/// Returns the sweep configuration of the `file_idx`-th file
	pub fn sweep_config_of(&self, file_idx: usize) -> Option<SweepConfig> {
		self.iteration_of(file_idx).map(|iteration| self.sweep_configs[iteration])
	}
}

/// Builds one event graph per file from the synthesized printf lines.
///
/// Graphs are returned in file order. Only `root_child` events are accepted
/// as children of each root.
pub fn build_graphs<'a>(lines: impl IntoIterator<Item = &'a str>, root_child: &str) -> Vec<EventGraph> {
	let mut graphs = Vec::<EventGraph>::new();
	for line in lines {
		if line.contains(ROOT_MARKER) {
			match Event::parse(line) {
				Some(root) => graphs.push(EventGraph::with_root_child(root, root_child)),
				None => tracing::warn!(?line, "Skipping malformed root event"),
			}
		} else if line.contains(EVENT_MARKER) {
			let Some(event) = Event::parse(line) else {
				tracing::warn!(?line, "Skipping malformed event");
				continue;
			};
			let Some(graph) = graphs.last_mut() else {
				tracing::debug!(?line, "Skipping event before any root event");
				continue;
			};

			tracing::trace!(%event, "Adding event");
			let outcome = graph.add_event(event);
			tracing::trace!(?outcome, "Added event");
		}
	}

	graphs
}

/// Mean latency of each event, per sweep iteration.
///
/// Iterations are returned in run order, each with its sweep configuration.
/// Iterations sharing a configuration are kept apart, and iterations
/// without any latencies are skipped.
///
/// # Errors
/// Returns an error if there are more graphs than files in the run.
pub fn latencies_by_config(
	info: &BenchmarkInfo,
	graphs: &[EventGraph],
) -> Result<Vec<(SweepConfig, BTreeMap<String, f64>)>, anyhow::Error> {
	let mut iterations = info
		.sweep_configs
		.iter()
		.map(|&config| (config, BTreeMap::<String, Mean>::new()))
		.collect::<Vec<_>>();
	for (file_idx, graph) in graphs.iter().enumerate() {
		let iteration = info
			.iteration_of(file_idx)
			.ok_or_else(|| anyhow::anyhow!("File #{file_idx} has no sweep configuration"))?;

		let (_, iteration_latencies) = &mut iterations[iteration];
		for (name, latencies) in graph.latencies() {
			let mean = iteration_latencies.entry(name).or_default();
			for latency in latencies {
				mean.add(latency as f64);
			}
		}
	}

	Ok(iterations
		.into_iter()
		.filter(|(_, latencies)| !latencies.is_empty())
		.map(|(config, latencies)| {
			let latencies = latencies
				.into_iter()
				.map(|(name, mean)| (name, mean.mean()))
				.collect();
			(config, latencies)
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn event(name: &str, cycle: u64, event_id: u64, parent_id: u64) -> Event {
		Event {
			name: name.to_owned(),
			cycle,
			event_id,
			parent_id,
		}
	}

	fn line(marker: &str, name: &str, cycle: u64, event_id: u64, parent_id: u64) -> String {
		format!("[{marker}] printf: eid {event_id}, pid {parent_id}, cycle {cycle}, name \\\"{name}\\\"")
	}

	#[test]
	fn parse_event_line() {
		let line = line(EVENT_MARKER, "LZ77Fire", 1234, 3, 0);
		assert_eq!(Event::parse(&line), Some(event("LZ77Fire", 1234, 3, 0)));
		assert_eq!(Event::parse("CYCLE: too short"), None);
	}

	#[test]
	fn fifo_parent_matching() {
		let mut graph = EventGraph::new(event("FileHeader", 0, 0, 0));

		let fire_a = graph.add_event(event("LZ77Fire", 10, 1, 0));
		let fire_b = graph.add_event(event("LZ77Fire", 20, 1, 0));
		let AddOutcome::Linked(fire_a) = fire_a else { panic!("Expected linked, found {fire_a:?}") };
		let AddOutcome::Linked(fire_b) = fire_b else { panic!("Expected linked, found {fire_b:?}") };

		// Both fires hang from the root, since it's never dequeued
		assert_eq!(graph.children(NodeIdx(0)), [fire_a, fire_b]);

		// Each encode consumes the oldest pending fire
		let AddOutcome::Linked(encode_a) = graph.add_event(event("Encode", 15, 2, 1)) else { panic!() };
		let AddOutcome::Linked(encode_b) = graph.add_event(event("Encode", 27, 2, 1)) else { panic!() };
		assert_eq!(graph.children(fire_a), [encode_a]);
		assert_eq!(graph.children(fire_b), [encode_b]);

		// No more pending fires
		assert!(matches!(graph.add_event(event("Encode", 30, 2, 1)), AddOutcome::Unlinked(_)));
	}

	#[test]
	fn dropped_events() {
		let mut graph = EventGraph::new(event("FileHeader", 0, 0, 0));
		assert_eq!(graph.add_event(event("Encode", 5, 2, 9)), AddOutcome::UnknownParent);
		assert_eq!(graph.add_event(event("Other", 5, 4, 0)), AddOutcome::Filtered);
		assert_eq!(graph.len(), 1);
		assert!(graph.is_empty());
	}

	#[test]
	fn latencies_from_first_root_child() {
		let mut graph = EventGraph::new(event("FileHeader", 0, 0, 0));
		graph.add_event(event("LZ77Fire", 10, 1, 0));
		graph.add_event(event("Encode", 15, 2, 1));
		graph.add_event(event("Write", 22, 3, 2));
		graph.add_event(event("LZ77Fire", 40, 1, 0));
		graph.add_event(event("Encode", 49, 2, 1));

		let latencies = graph.latencies();
		assert_eq!(latencies.get("Encode"), Some(&vec![5]));
		assert_eq!(latencies.get("Write"), Some(&vec![7]));
		assert_eq!(latencies.get("LZ77Fire"), None);
	}

	#[test]
	fn benchmark_info() {
		let total = "TOTAL: Took 16565677 cycles consumed 25746432 uncompressed bytes produced compsize 5678766 bytes \
		             SuccessNBenchmarks 188 TotalNBenchmarks 188 with histsram 2048 with log2HTSize 9 latency 400 \
		             hasCache 1\r";
		let mut lines = vec!["Start cycle: 1"; 4];
		lines.push(total);
		lines.extend(["Start cycle: 1"; 4]);
		lines.push(total);

		let info = BenchmarkInfo::parse(lines);
		assert_eq!(info.files_per_iter, 4);
		assert_eq!(info.sweep_configs.len(), 2);
		assert_eq!(info.sweep_configs[0], SweepConfig {
			hist_sram: 2048,
			log2_ht:   9,
			latency:   400,
			has_cache: true,
		});
		assert_eq!(info.sweep_config_of(7), Some(info.sweep_configs[1]));
		assert_eq!(info.sweep_config_of(8), None);

		let info = BenchmarkInfo::parse(["Start cycle: 1"]);
		assert_eq!(info.files_per_iter, 1);
		assert_eq!(info.sweep_configs, [SweepConfig::default()]);
	}

	#[test]
	fn mean_latencies() {
		let lines = [
			line(ROOT_MARKER, "FileHeader", 0, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 10, 1, 0),
			line(EVENT_MARKER, "Encode", 14, 2, 1),
			line(ROOT_MARKER, "FileHeader", 100, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 110, 1, 0),
			line(EVENT_MARKER, "Encode", 120, 2, 1),
		];
		let graphs = build_graphs(lines.iter().map(String::as_str), DEFAULT_ROOT_CHILD);
		assert_eq!(graphs.len(), 2);

		let info = BenchmarkInfo {
			files_per_iter: 2,
			sweep_configs:  vec![SweepConfig::default()],
		};
		let latencies = latencies_by_config(&info, &graphs).expect("All files should have a config");
		assert_eq!(latencies.len(), 1);
		assert_eq!(latencies[0].0, SweepConfig::default());
		assert_eq!(latencies[0].1["Encode"], 7.0);
	}

	#[test]
	fn repeated_configs_are_kept_apart() {
		let lines = [
			line(ROOT_MARKER, "FileHeader", 0, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 10, 1, 0),
			line(EVENT_MARKER, "Encode", 14, 2, 1),
			line(ROOT_MARKER, "FileHeader", 100, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 110, 1, 0),
			line(EVENT_MARKER, "Encode", 120, 2, 1),
		];
		let graphs = build_graphs(lines.iter().map(String::as_str), DEFAULT_ROOT_CHILD);

		let info = BenchmarkInfo {
			files_per_iter: 1,
			sweep_configs:  vec![SweepConfig::default(); 2],
		};
		let latencies = latencies_by_config(&info, &graphs).expect("All files should have a config");
		assert_eq!(latencies.len(), 2);
		assert_eq!(latencies[0].1["Encode"], 4.0);
		assert_eq!(latencies[1].1["Encode"], 10.0);
	}

	#[test]
	fn more_files_than_configs() {
		let lines = [
			line(ROOT_MARKER, "FileHeader", 0, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 10, 1, 0),
			line(ROOT_MARKER, "FileHeader", 100, 0, 0),
			line(EVENT_MARKER, "LZ77Fire", 110, 1, 0),
		];
		let graphs = build_graphs(lines.iter().map(String::as_str), DEFAULT_ROOT_CHILD);

		let info = BenchmarkInfo {
			files_per_iter: 1,
			sweep_configs:  vec![SweepConfig::default()],
		};
		let err = latencies_by_config(&info, &graphs).expect_err("Second file has no config");
		assert!(err.to_string().contains("File #1"), "Unexpected error: {err}");
	}

	#[test]
	fn display_event() {
		assert_eq!(event("Encode", 15, 2, 1).to_string(), "Encode 15 2 1");
	}
}
