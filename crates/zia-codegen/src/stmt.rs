//! Statement block rendering.
//!
//! A statement renders to one or more lines at the current depth; nested
//! bodies render one level deeper. Indentation is applied here and never
//! stored on the graph.

use crate::generator::Renderer;
use crate::precedence::Precedence;
use zia_types::{BlockId, BlockKind, BlockNode, ClauseKind};

impl Renderer<'_> {
    /// Render a statement chain starting at `head`.
    pub(crate) fn chain(&mut self, head: Option<BlockId>, depth: usize) {
        let ids: Vec<BlockId> = self.graph.chain(head).collect();
        for id in ids {
            self.statement(id, depth);
        }
    }

    fn body(&mut self, block: BlockId, input: &str, depth: usize) {
        let head = self.graph.get(block).and_then(|n| n.target(input));
        self.chain(head, depth);
    }

    fn statement(&mut self, id: BlockId, depth: usize) {
        let graph = self.graph;
        let Some(node) = graph.get(id) else {
            return;
        };
        let none = Precedence::None;

        match node.kind {
            BlockKind::AfficherText => {
                let text = self.value(id, "TEXT", none, "\"\"");
                self.line(depth, format!("afficher {text};"));
            }
            BlockKind::VarDeclaration => {
                let name = self.names.resolve(node, "VAR");
                let value = self.value(id, "VALUE", none, "0");
                self.line(depth, format!("var {name} = {value};"));
            }
            BlockKind::VariablesSet => {
                let name = self.names.resolve(node, "VAR");
                let value = self.value(id, "VALUE", none, "0");
                self.line(depth, format!("{name} = {value};"));
            }
            BlockKind::DemanderText => {
                let name = self.names.resolve(node, "VAR");
                let prompt = self.value(id, "PROMPT", none, "\"Question\"");
                self.line(depth, format!("{name} = demander({prompt});"));
            }
            BlockKind::Attendre => {
                let duration = self.value(id, "DURATION", none, "1");
                self.line(depth, format!("attendre({duration});"));
            }

            BlockKind::ControlsSi => self.conditional(node, depth),
            BlockKind::ControlsSelon => self.switch(node, depth),
            BlockKind::ControlsPour => {
                let var = self.names.resolve(node, "VAR");
                let from = self.value(id, "FROM", none, "1");
                let to = self.value(id, "TO", none, "10");
                self.line(
                    depth,
                    format!("pour (var {var} = {from}; {var} <= {to}; {var} = {var} + 1) {{"),
                );
                self.body(id, "DO", depth + 1);
                self.line(depth, "}");
            }
            BlockKind::ControlsTantque => {
                let condition = self.value(id, "WHILE", none, "faux");
                self.line(depth, format!("tantque ({condition}) {{"));
                self.body(id, "DO", depth + 1);
                self.line(depth, "}");
            }
            BlockKind::ControlsQuitter => self.line(depth, "quitter;"),
            BlockKind::ControlsContinuer => self.line(depth, "continuer;"),

            BlockKind::FonctionDefinition => {
                let name = node.field("NAME").unwrap_or("ma_fonction");
                let params = node.field("PARAMS").unwrap_or_default();
                self.line(depth, format!("fonction {name}({params}) {{"));
                self.body(id, "STACK", depth + 1);
                self.line(depth, "}");
            }
            BlockKind::FonctionCall => {
                let name = node.field("NAME").unwrap_or("ma_fonction");
                let args = node.field("ARGS").unwrap_or_default();
                self.line(depth, format!("{name}({args});"));
            }
            BlockKind::Retourner => {
                let value = self.value(id, "VALUE", none, "nul");
                self.line(depth, format!("retourner {value};"));
            }

            BlockKind::ListeSet => {
                let list = self.value(id, "LIST", Precedence::FunctionCall, "liste");
                let index = self.value(id, "INDEX", none, "0");
                let value = self.value(id, "VALUE", none, "0");
                self.line(depth, format!("{list}[{index}] = {value};"));
            }
            BlockKind::Commentaire => {
                let text = node.field("TEXT").unwrap_or_default().replace('\n', " ");
                self.line(depth, format!("// {text}"));
            }
            BlockKind::EssayerAttraper => {
                let error = self.names.resolve(node, "ERROR_VAR");
                self.line(depth, "essayer {");
                self.body(id, "TRY", depth + 1);
                self.line(depth, format!("}} attraper ({error}) {{"));
                self.body(id, "CATCH", depth + 1);
                self.line(depth, "}");
            }
            BlockKind::LancerErreur => {
                let message = self.value(id, "MESSAGE", none, "\"Erreur\"");
                self.line(depth, format!("lancer {message};"));
            }

            // Value blocks are never part of a statement chain.
            _ => {}
        }
    }

    /// `si` with its else-if clauses in index order, then `sinon`.
    fn conditional(&mut self, node: &BlockNode, depth: usize) {
        let id = node.id;
        let condition = self.value(id, "IF0", Precedence::None, "faux");
        self.line(depth, format!("si ({condition}) {{"));
        self.body(id, "DO0", depth + 1);

        let mutation = node.mutation().cloned().unwrap_or_default();
        for index in 0..mutation.count(ClauseKind::ElseIf) {
            let slots = ClauseKind::ElseIf.inputs(index);
            let condition = slots
                .condition
                .map(|input| self.value(id, &input, Precedence::None, "faux"))
                .unwrap_or_else(|| "faux".to_string());
            self.line(depth, format!("}} sinon si ({condition}) {{"));
            if let Some(body) = slots.body {
                self.body(id, &body, depth + 1);
            }
        }
        if mutation.count(ClauseKind::Else) > 0 {
            self.line(depth, "} sinon {");
            self.body(id, "ELSE", depth + 1);
        }
        self.line(depth, "}");
    }

    /// `selon` with `cas` labels one level in and their bodies two levels in.
    fn switch(&mut self, node: &BlockNode, depth: usize) {
        let id = node.id;
        let subject = self.value(id, "SWITCH", Precedence::None, "0");
        self.line(depth, format!("selon ({subject}) {{"));

        let mutation = node.mutation().cloned().unwrap_or_default();
        for index in 0..mutation.count(ClauseKind::Case) {
            let slots = ClauseKind::Case.inputs(index);
            let label = slots
                .condition
                .map(|input| self.value(id, &input, Precedence::None, "0"))
                .unwrap_or_else(|| "0".to_string());
            self.line(depth + 1, format!("cas {label}:"));
            if let Some(body) = slots.body {
                self.body(id, &body, depth + 2);
            }
        }
        if mutation.count(ClauseKind::Default) > 0 {
            self.line(depth + 1, "defaut:");
            self.body(id, "DEFAULT", depth + 2);
        }
        self.line(depth, "}");
    }
}
