//! Text rendering of symbol trees.

use super::symbol::{ClusterSymbol, DatabaseSymbol, Member};

impl DatabaseSymbol {
    /// Render the database as indented text, one member per line.
    ///
    /// ```text
    /// database Samples
    ///   table StormEvents (StartTime:datetime, State:string)  // Storm data
    ///   function Top(n:long)
    /// ```
    pub fn to_schema_text(&self) -> String {
        let mut out = format!("database {}", self.name);
        for member in &self.members {
            out.push('\n');
            render_member(&mut out, member, "  ");
        }
        out
    }
}

impl ClusterSymbol {
    /// Render every database of the cluster.
    pub fn to_schema_text(&self) -> String {
        let mut out = format!("cluster {}", self.name);
        for database in &self.databases {
            for line in database.to_schema_text().lines() {
                out.push_str("\n  ");
                out.push_str(line);
            }
        }
        out
    }
}

fn render_member(out: &mut String, member: &Member, indent: &str) {
    out.push_str(indent);
    out.push_str(&match member {
        Member::Table(t) => format!("table {} {}", t.name, t.schema()),
        Member::ExternalTable(t) => format!("external table {} {}", t.name, t.schema),
        Member::MaterializedView(v) => format!(
            "materialized view {} {} = {}",
            v.name,
            v.schema,
            single_line(&v.query)
        ),
        Member::Function(f) => format!("function {}{}", f.name, f.parameters_text),
        Member::EntityGroup(g) => format!("entity group {} {}", g.name, g.definition),
    });

    if let Some(description) = member.description() {
        out.push_str("  // ");
        out.push_str(&single_line(description));
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
