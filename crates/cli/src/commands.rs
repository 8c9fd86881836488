use crate::{
    ClassifyArgs, DetectArgs, ElementArgs, GraphArgs, LinkAllArgs, SearchArgs, SnapshotArgs,
};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use worldlink_graph::{reverse_links_for, RelationshipGraph};
use worldlink_inference::{FieldClassification, FieldInference};
use worldlink_linking::{CommitStatus, LinkSession};
use worldlink_mentions::{DetectorConfig, ElementSearch, LinkedIdSet, MentionDetector};
use worldlink_model::{Category, Element, ElementSnapshot, FieldValue};

fn load_snapshot(path: &Path) -> Result<ElementSnapshot> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = ElementSnapshot::from_json(&bytes)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    log::info!("Loaded {} elements from {}", snapshot.len(), path.display());
    Ok(snapshot)
}

fn load_config(path: Option<&Path>) -> Result<DetectorConfig> {
    match path {
        Some(path) => DetectorConfig::from_file(path),
        None => Ok(DetectorConfig::default()),
    }
}

fn find<'a>(snapshot: &'a ElementSnapshot, id: &str) -> Result<&'a Element> {
    snapshot
        .get(id)
        .ok_or_else(|| anyhow!("Element '{id}' not found in snapshot"))
}

fn parse_value(raw: Option<&str>) -> FieldValue {
    match raw {
        None => FieldValue::Null,
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| FieldValue::text(raw)),
    }
}

pub(crate) fn classify(args: ClassifyArgs) -> Result<Value> {
    let engine = FieldInference::default();
    let snapshot = args.snapshot.as_deref().map(load_snapshot).transpose()?;

    if let Some(id) = &args.element {
        let Some(snapshot) = &snapshot else {
            bail!("--element needs --snapshot");
        };
        let element = find(snapshot, id)?;
        return Ok(serde_json::to_value(engine.classify_element_in(snapshot, element))?);
    }

    let Some(field) = args.field else {
        bail!("Pass --element or --field");
    };
    let value = parse_value(args.value.as_deref());
    let owner = args.owner.map(Category::new);
    let classification = match &snapshot {
        Some(snapshot) => engine.classify_in(snapshot, &field, &value, owner.as_ref()),
        None => engine.classify(&field, &value, owner.as_ref()),
    };

    Ok(serde_json::to_value(FieldClassification {
        field_name: field,
        classification,
    })?)
}

pub(crate) fn reverse_links(args: ElementArgs) -> Result<Value> {
    let snapshot = load_snapshot(&args.source.snapshot)?;
    let index = reverse_links_for(&args.id, &snapshot, &FieldInference::default());
    Ok(serde_json::to_value(index)?)
}

pub(crate) fn forward_links(args: ElementArgs) -> Result<Value> {
    let snapshot = load_snapshot(&args.source.snapshot)?;
    let graph = RelationshipGraph::build(&snapshot, &FieldInference::default());
    let links = graph.forward_links(&args.id)?;
    Ok(serde_json::to_value(links)?)
}

pub(crate) fn graph(args: GraphArgs) -> Result<Value> {
    let snapshot = load_snapshot(&args.source.snapshot)?;
    let graph = RelationshipGraph::build(&snapshot, &FieldInference::default());
    let export = match &args.around {
        Some(id) => graph.export_neighborhood(id, args.depth)?,
        None => graph.export(),
    };
    Ok(serde_json::to_value(export)?)
}

pub(crate) fn detect(args: DetectArgs) -> Result<Value> {
    let snapshot = load_snapshot(&args.source.snapshot)?;
    let config = load_config(args.config.as_deref())?;
    let detector = MentionDetector::from_snapshot(&snapshot, config)?;

    let mentions = match (&args.element, &args.text) {
        (Some(id), _) => {
            let engine = FieldInference::default();
            let session = LinkSession::new(&engine, find(&snapshot, id)?.clone(), &args.field)?
                .with_snapshot(&snapshot);
            session.detect(&detector)
        }
        (None, Some(text)) => detector.detect(text, &LinkedIdSet::new()),
        (None, None) => bail!("Pass --element or --text"),
    };
    Ok(serde_json::to_value(mentions)?)
}

pub(crate) fn link_all(args: LinkAllArgs) -> Result<Value> {
    let SnapshotArgs { snapshot: path } = &args.source;
    let mut snapshot = load_snapshot(path)?;
    let detector = MentionDetector::from_snapshot(&snapshot, load_config(args.config.as_deref())?)?;
    let engine = FieldInference::default();

    let known = snapshot.clone();
    let element = find(&known, &args.element)?.clone();
    let mut session = LinkSession::new(&engine, element, &args.field)?.with_snapshot(&known);
    let mentions = session.detect(&detector);
    let report = session.link_all(&mentions, !args.no_rewrite);
    let changes = session.pending();

    let status = if args.write {
        let status = session.commit(&mut snapshot);
        if status == CommitStatus::Committed {
            std::fs::write(path, snapshot.to_json()?)
                .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        }
        Some(status)
    } else {
        None
    };

    Ok(json!({
        "mentions": mentions,
        "report": report,
        "changes": changes,
        "status": status,
    }))
}

pub(crate) fn search(args: SearchArgs) -> Result<Value> {
    let snapshot = load_snapshot(&args.source.snapshot)?;
    let category = args.category.map(Category::new);
    let mut search = ElementSearch::new();

    let hits: Vec<Value> = search
        .search(&args.query, snapshot.iter(), category.as_ref(), args.limit)
        .into_iter()
        .map(|(element, score)| {
            json!({
                "id": element.id,
                "name": element.name,
                "category": element.category,
                "score": score,
            })
        })
        .collect();
    Ok(Value::Array(hits))
}
