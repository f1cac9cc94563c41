use crate::text::Segment;

pub const SEGMENT_DELIMITER: &str = "\n\n---\n\n";

/// Stage A: narrative beats of one cluster of cut text.
pub fn cluster_prompt(segments: &[&Segment]) -> String {
    let cluster_text = segments
        .iter()
        .map(|s| s.text())
        .collect::<Vec<_>>()
        .join(SEGMENT_DELIMITER);

    format!(
        "You are a story editor. Read the following text, which was cut from an adaptation of the original work.\n\
         Your goal is to identify the distinct narrative beats: significant scenes or mini-arcs.\n\
         For each significant beat, write a short summary (2-3 sentences) explaining what happens and its narrative purpose.\n\
         Ignore trivial details. Focus on story beats.\n\n\
         TEXT CHUNK:\n---\n{}\n---\n\n\
         Summarize the significant missing scenes or mini-arcs below:\n",
        cluster_text
    )
}

/// Header placed before a cluster's stage A output in the aggregate text. Ids are shown 1-based.
pub fn cluster_header(cluster_id: usize) -> String {
    format!("\n\n--- Topic Cluster {} ---\n", cluster_id + 1)
}

/// Stage B: restructure the aggregate analysis into the report object.
pub fn structuring_prompt(analysis: &str) -> String {
    format!(
        "Based on the following detailed analysis of missing content, structure the output into a JSON object.\n\
         The JSON must have exactly two keys: \"summary\" (a string summarizing the total findings) and \"categories\" (an array of objects).\n\
         Each object in \"categories\" must have \"title\" (string, e.g. \"Character Backstory\"), \
         \"missing\" (integer, the number of items in that category) and \"description\" (string, a summary of that category's missing content).\n\
         Infer the category titles and counts from the analysis. Respond with the JSON object only.\n\n\
         ANALYSIS TEXT:\n---\n{}\n---\n\n\
         JSON OUTPUT:\n",
        analysis
    )
}
