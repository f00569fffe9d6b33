use std::fmt::Display;
use std::io;

use super::Bimap;
use crate::avl_tree;
use crate::record::{LeftSide, RightSide, Side};

fn escape(s: String) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl<L, R, CL, CR> Bimap<L, R, CL, CR>
where
    L: Display,
    R: Display,
{
    /// Dumps the left tree in DOT format.
    pub fn emit_graphviz_left(&self, f: &mut impl io::Write) -> io::Result<()> {
        self.emit_graphviz::<LeftSide>(f)
    }

    /// Dumps the right tree in DOT format.
    pub fn emit_graphviz_right(&self, f: &mut impl io::Write) -> io::Result<()> {
        self.emit_graphviz::<RightSide>(f)
    }

    fn emit_graphviz<S: Side>(&self, f: &mut impl io::Write) -> io::Result<()>
    where
        S::Value<L, R>: Display,
        <S::Flip as Side>::Value<L, R>: Display,
    {
        writeln!(f, "digraph {}Tree {{", S::NAME)?;
        writeln!(f, "  // Node settings")?;
        writeln!(f, "  node [")?;
        writeln!(f, "    fontname = \"Helvetica\"")?;
        writeln!(f, "    fontsize = 11")?;
        writeln!(f, "    shape = \"box\"")?;
        writeln!(f, "    style = \"rounded\"")?;
        writeln!(f, "  ]")?;

        let mut cur = avl_tree::first::<S, L, R>(&self.pool);
        while let Some(id) = cur {
            let links = self.pool.links::<S>(id);
            let n = usize::from(id);
            let label = escape(format!(
                "{} / {}",
                self.pool.value::<S>(id),
                self.pool.value::<S::Flip>(id)
            ));
            writeln!(f, "  n{} [label = \"{}\\nh={}\"]", n, label, links.height)?;
            if let Some(l) = links.left {
                writeln!(f, "  n{} -> n{} [label = \"L\"]", n, usize::from(l))?;
            }
            if let Some(r) = links.right {
                writeln!(f, "  n{} -> n{} [label = \"R\"]", n, usize::from(r))?;
            }
            cur = avl_tree::next::<S, L, R>(&self.pool, cur);
        }

        writeln!(f, "}}")?;
        Ok(())
    }
}
