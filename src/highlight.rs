use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::{GeneNumber, GeneRecord, KoCode, Rgb};
use crate::error::AnnotatorError;
use crate::graph::{PathwayGraph, PathwayNode};

/// Fill color for every KO code outside the highlighted sets.
pub const NEUTRAL_GRAY: Rgb = Rgb::new(0xd9, 0xd9, 0xd9);

/// Pathways at or above this many total members are dropped from the
/// query view; the giant overview maps drown out any highlight.
pub const MAX_QUERY_MEMBERS: usize = 104;

/// Named colors offered for highlight sets, in a fixed order so weight
/// maps are always built the same way.
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<(String, Rgb)>,
}

impl Default for Palette {
    fn default() -> Self {
        let entries = [
            ("blue", Rgb::new(0x7D, 0xF9, 0xFF)),
            ("purple", Rgb::new(0xDB, 0x70, 0xFF)),
            ("red", Rgb::new(0xFF, 0x26, 0x1F)),
            ("orange", Rgb::new(0xFF, 0xAE, 0x42)),
            ("yellow", Rgb::new(0xFF, 0xF6, 0x00)),
            ("green", Rgb::new(0x39, 0xFF, 0x14)),
            ("pink", Rgb::new(0xFF, 0x66, 0xCC)),
            ("brown", Rgb::new(0xAF, 0x6E, 0x4D)),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();
        Self { entries }
    }
}

impl Palette {
    /// Accepts a palette color name (case-insensitive) or a literal
    /// 6-hex-digit value.
    pub fn resolve(&self, spec: &str) -> Result<Rgb, AnnotatorError> {
        let lowered = spec.trim().to_lowercase();
        if let Some((_, color)) = self.entries.iter().find(|(name, _)| *name == lowered) {
            return Ok(*color);
        }
        spec.parse()
    }
}

/// One externally-supplied partition entry: a color and the gene
/// accessions it highlights.
#[derive(Debug, Clone)]
pub struct HighlightSet {
    pub color: Rgb,
    pub genes: HashSet<GeneNumber>,
}

/// Blended fill color per KO code, derived from the highlight sets. Codes
/// reachable from no highlighted gene are absent and fall back to
/// [`NEUTRAL_GRAY`] on lookup. Pure derivation; the graph is never
/// touched.
#[derive(Debug, Clone, Default)]
pub struct ColorBlendMap {
    colors: HashMap<KoCode, Rgb>,
}

impl ColorBlendMap {
    /// For each KO code shared by at least one highlighted gene, weights
    /// every contributing set color by how many of the code's genes it
    /// highlights, then averages the channels over the total weight.
    /// Sets contribute in their configured order.
    pub fn compute(genes: &[GeneRecord], sets: &[HighlightSet]) -> Self {
        let mut genes_by_code: HashMap<&KoCode, Vec<&GeneRecord>> = HashMap::new();
        for gene in genes {
            genes_by_code.entry(&gene.ko_code).or_default().push(gene);
        }

        let mut colors = HashMap::new();
        for (code, code_genes) in genes_by_code {
            let mut weights: Vec<(Rgb, u32)> = Vec::new();
            for set in sets {
                let count = code_genes
                    .iter()
                    .filter(|gene| set.genes.contains(&gene.gene_number))
                    .count() as u32;
                if count == 0 {
                    continue;
                }
                match weights.iter_mut().find(|(color, _)| *color == set.color) {
                    Some((_, weight)) => *weight += count,
                    None => weights.push((set.color, count)),
                }
            }
            if !weights.is_empty() {
                colors.insert(code.clone(), blend(&weights));
            }
        }

        Self { colors }
    }

    pub fn contains(&self, code: &KoCode) -> bool {
        self.colors.contains_key(code)
    }

    pub fn color_for(&self, code: &KoCode) -> Rgb {
        self.colors.get(code).copied().unwrap_or(NEUTRAL_GRAY)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Weighted average of the contributing colors, each channel divided by
/// the total weight with the fraction truncated.
fn blend(weights: &[(Rgb, u32)]) -> Rgb {
    let total: u32 = weights.iter().map(|(_, weight)| *weight).sum();
    debug_assert!(total > 0);
    let channel = |pick: fn(&Rgb) -> u8| {
        let sum: u32 = weights
            .iter()
            .map(|(color, weight)| u32::from(pick(color)) * weight)
            .sum();
        (sum / total) as u8
    };
    Rgb {
        r: channel(|c| c.r),
        g: channel(|c| c.g),
        b: channel(|c| c.b),
    }
}

/// Filtered read-only view over the full graph for one highlight query:
/// the indices of retained pathways plus, per pathway, the members that
/// are actually highlighted. The graph itself is neither copied nor
/// mutated.
#[derive(Debug)]
pub struct QueryView {
    entries: Vec<QueryEntry>,
}

#[derive(Debug)]
struct QueryEntry {
    node_index: usize,
    highlighted: Vec<KoCode>,
}

impl QueryView {
    pub fn build(graph: &PathwayGraph, blend: &ColorBlendMap) -> Self {
        let mut entries = Vec::new();
        for (node_index, node) in graph.nodes().iter().enumerate() {
            if node.member_count() >= MAX_QUERY_MEMBERS {
                continue;
            }
            let highlighted: Vec<KoCode> = node
                .members()
                .iter()
                .filter(|code| blend.contains(code))
                .cloned()
                .collect();
            if highlighted.is_empty() {
                continue;
            }
            entries.push(QueryEntry {
                node_index,
                highlighted,
            });
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter<'a>(
        &'a self,
        graph: &'a PathwayGraph,
    ) -> impl Iterator<Item = (&'a PathwayNode, &'a [KoCode])> {
        self.entries
            .iter()
            .map(move |entry| (&graph.nodes()[entry.node_index], entry.highlighted.as_slice()))
    }
}

/// How pathway-map URLs color their members. The blended strategy carries
/// the compositor's output; the default is the original fixed two-color
/// scheme with an optional emphasized gene.
#[derive(Debug, Clone, Copy)]
pub enum UrlColoring<'a> {
    Default { selected: Option<&'a KoCode> },
    Blended(&'a ColorBlendMap),
}

/// KEGG `show_pathway` hyperlink for one pathway, one `KO+%23RRGGBB`
/// query entry per member, joined by the URL-escaped newline `%0a`.
pub fn pathway_url(node: &PathwayNode, coloring: UrlColoring<'_>) -> String {
    let mut url = format!(
        "http://www.kegg.jp/kegg-bin/show_pathway?map={}&multi_query=",
        node.map_code
    );
    match coloring {
        UrlColoring::Blended(blend) => {
            for code in node.members() {
                url.push_str(&format!("{}+%23{}%0a", code, blend.color_for(code)));
            }
        }
        UrlColoring::Default { selected } => {
            for code in node.members() {
                url.push_str(&format!("{code}+%23bfffbf%0a"));
            }
            if let Some(code) = selected {
                url.push_str(&format!("{code}+%238B0000,%23F0F8FF"));
            }
        }
    }
    url
}

/// Annotation handed to the reporting collaborator: the KO→color map and
/// one pre-linked entry per retained pathway.
#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub colors: BTreeMap<String, String>,
    pub pathways: Vec<PathwayAnnotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathwayAnnotation {
    pub map_code: String,
    pub name: String,
    pub highlighted_members: usize,
    pub total_members: usize,
    pub url: String,
}

pub fn annotate(
    genes: &[GeneRecord],
    graph: &PathwayGraph,
    sets: &[HighlightSet],
) -> Annotation {
    // Without highlight data every pathway is listed with the fixed
    // default coloring instead of an empty query view.
    if sets.is_empty() {
        let pathways = graph
            .nodes()
            .iter()
            .map(|node| PathwayAnnotation {
                map_code: node.map_code.as_str().to_string(),
                name: node.name.clone(),
                highlighted_members: 0,
                total_members: node.member_count(),
                url: pathway_url(node, UrlColoring::Default { selected: None }),
            })
            .collect();
        let colors = genes
            .iter()
            .map(|gene| (gene.ko_code.as_str().to_string(), NEUTRAL_GRAY.to_hex()))
            .collect();
        return Annotation { colors, pathways };
    }

    let blend = ColorBlendMap::compute(genes, sets);
    let view = QueryView::build(graph, &blend);

    let mut colors = BTreeMap::new();
    for gene in genes {
        colors
            .entry(gene.ko_code.as_str().to_string())
            .or_insert_with(|| blend.color_for(&gene.ko_code).to_hex());
    }

    let pathways = view
        .iter(graph)
        .map(|(node, highlighted)| PathwayAnnotation {
            map_code: node.map_code.as_str().to_string(),
            name: node.name.clone(),
            highlighted_members: highlighted.len(),
            total_members: node.member_count(),
            url: pathway_url(node, UrlColoring::Blended(&blend)),
        })
        .collect();

    Annotation { colors, pathways }
}
