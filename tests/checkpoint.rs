use camino::Utf8PathBuf;

use kegg_gene_annotator::checkpoint::Checkpoint;
use kegg_gene_annotator::domain::{GeneRecord, PathwayRef};
use kegg_gene_annotator::graph::PathwayNode;

fn sample_checkpoint() -> Checkpoint {
    let gene = GeneRecord {
        gene_number: "G1".parse().unwrap(),
        ko_code: "K04958".parse().unwrap(),
        name: "ITPR1".to_string(),
        definition: "inositol 1,4,5-triphosphate receptor type 1".to_string(),
        pathway_refs: vec![PathwayRef {
            map_code: "map04020".parse().unwrap(),
            name: "Calcium signaling pathway".to_string(),
        }],
    };
    let mut node = PathwayNode::new(
        "map04020".parse().unwrap(),
        "Calcium signaling pathway".to_string(),
    );
    node.add_member("K04958".parse().unwrap());
    Checkpoint {
        complete: false,
        genes: vec![gene],
        pathways: vec![node],
    }
}

fn data_path(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("genes.dat")).unwrap()
}

#[test]
fn write_then_load_round_trips() {
    let temp = tempfile::tempdir().unwrap();
    let path = data_path(&temp);
    let checkpoint = sample_checkpoint();
    checkpoint.write(&path).unwrap();
    let loaded = Checkpoint::load(&path).unwrap().unwrap();
    assert_eq!(checkpoint, loaded);
}

#[test]
fn absent_file_is_no_checkpoint() {
    let temp = tempfile::tempdir().unwrap();
    assert!(Checkpoint::load(&data_path(&temp)).unwrap().is_none());
}

#[test]
fn truncated_tail_is_no_checkpoint() {
    let temp = tempfile::tempdir().unwrap();
    let path = data_path(&temp);
    sample_checkpoint().write(&path).unwrap();

    let bytes = std::fs::read(path.as_std_path()).unwrap();
    std::fs::write(path.as_std_path(), &bytes[..bytes.len() / 2]).unwrap();
    assert!(Checkpoint::load(&path).unwrap().is_none());
}

#[test]
fn garbage_file_is_no_checkpoint() {
    let temp = tempfile::tempdir().unwrap();
    let path = data_path(&temp);
    std::fs::write(path.as_std_path(), b"not a checkpoint at all").unwrap();
    assert!(Checkpoint::load(&path).unwrap().is_none());
}

#[test]
fn write_replaces_prior_version_and_leaves_no_temp_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = data_path(&temp);

    let mut checkpoint = sample_checkpoint();
    checkpoint.write(&path).unwrap();
    checkpoint.complete = true;
    checkpoint.write(&path).unwrap();

    let loaded = Checkpoint::load(&path).unwrap().unwrap();
    assert!(loaded.complete);

    let leftovers: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy() != "genes.dat")
        .collect();
    assert!(leftovers.is_empty());
}
