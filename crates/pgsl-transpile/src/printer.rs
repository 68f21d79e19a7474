// SPDX-License-Identifier: (MIT OR Apache-2.0)

use std::collections::HashMap;

use pgsl_analysis::{is_entry_attribute, SemanticModel};
use pgsl_ast::decl::*;
use pgsl_ast::expr::*;
use pgsl_ast::stmt::*;
use pgsl_ast::TypeId;
use pgsl_types::{NumericKind, TypeKind, TypeTable};

use crate::config::TranspileConfig;

/// `@group`/`@binding` indices, assigned by first appearance of each name.
#[derive(Default)]
struct Bindings {
    groups: Vec<(String, Vec<String>)>,
}

impl Bindings {
    fn index(&mut self, group: &str, binding: &str) -> (usize, usize) {
        let g = match self.groups.iter().position(|(name, _)| name == group) {
            Some(g) => g,
            None => {
                self.groups.push((group.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        let bindings = &mut self.groups[g].1;
        let b = match bindings.iter().position(|name| name == binding) {
            Some(b) => b,
            None => {
                bindings.push(binding.to_string());
                bindings.len() - 1
            }
        };
        (g, b)
    }
}

/// `@location` indices within one struct or function.
#[derive(Default)]
struct Locations {
    names: HashMap<String, usize>,
}

impl Locations {
    fn index(&mut self, name: &str) -> usize {
        let next = self.names.len();
        *self.names.entry(name.to_string()).or_insert(next)
    }
}

pub struct Printer<'a> {
    output: String,
    indent: usize,
    config: &'a TranspileConfig,
    document: &'a Document,
    types: &'a TypeTable,
    model: &'a SemanticModel,
    bindings: Bindings,
}

impl<'a> Printer<'a> {
    pub fn new(
        document: &'a Document,
        types: &'a TypeTable,
        model: &'a SemanticModel,
        config: &'a TranspileConfig,
    ) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            config,
            document,
            types,
            model,
            bindings: Bindings::default(),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    // --- Helpers ---

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        let spaces = self.indent * self.config.indent_width;
        for _ in 0..spaces {
            self.output.push(' ');
        }
    }

    fn emit_line(&mut self, s: &str) {
        self.emit_indent();
        self.emit(s);
        self.emit_newline();
    }

    /// Text of a string literal or of an enum value that holds one.
    fn attribute_text(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::String(s) => s.clone(),
            ExprKind::EnumValue { enum_name, value } => match self.enum_value(enum_name, value) {
                Some(inner) => self.attribute_text(inner),
                None => value.clone(),
            },
            _ => self.expr_text(expr),
        }
    }

    fn enum_value(&self, enum_name: &str, value: &str) -> Option<&'a Expr> {
        self.document
            .resolve_enum(enum_name)?
            .values
            .iter()
            .find(|v| v.name == value)
            .map(|v| &v.value)
    }

    fn expr_text(&self, expr: &Expr) -> String {
        let mut printer = Printer::new(self.document, self.types, self.model, self.config);
        printer.format_expr(expr);
        printer.output
    }

    // --- Types ---

    pub fn type_name(&self, ty: TypeId) -> String {
        match self.types.kind(ty) {
            TypeKind::Void => "void".to_string(),
            TypeKind::Boolean => "bool".to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Numeric(kind) => numeric_name(*kind).to_string(),
            TypeKind::Vector { dimension, inner } => format!("vec{}<{}>", dimension, self.type_name(*inner)),
            TypeKind::Matrix { columns, rows, inner } => {
                format!("mat{}x{}<{}>", columns, rows, self.type_name(*inner))
            }
            TypeKind::Array { inner, length: Some(length) } => {
                format!("array<{}, {}>", self.type_name(*inner), length)
            }
            TypeKind::Array { inner, length: None } => format!("array<{}>", self.type_name(*inner)),
            TypeKind::Struct { name } | TypeKind::Alias { name } => name.clone(),
            TypeKind::Enum { name } => match self.types.enum_underlying(name) {
                Some(underlying) => self.type_name(underlying),
                None => name.clone(),
            },
            TypeKind::Pointer { inner } => format!("ptr<function, {}>", self.type_name(*inner)),
            TypeKind::Sampler { comparison: false } => "sampler".to_string(),
            TypeKind::Sampler { comparison: true } => "sampler_comparison".to_string(),
            TypeKind::Texture { kind, sampled, format, access } => match (sampled, format, access) {
                (Some(sampled), _, _) => format!("{}<{}>", kind.wgsl_name(), self.type_name(*sampled)),
                (None, Some(format), Some(access)) => format!("{}<{}, {}>", kind.wgsl_name(), format, access),
                _ => kind.wgsl_name().to_string(),
            },
            TypeKind::BuildIn { underlying, .. } => self.type_name(*underlying),
        }
    }

    /// `@builtin(..) ` for build-in typed members, parameters and returns.
    fn builtin_attribute(&self, ty: TypeId) -> Option<String> {
        match self.types.kind(self.types.resolve_alias(ty)) {
            TypeKind::BuildIn { kind, .. } => Some(format!("@builtin({}) ", kind.wgsl_name())),
            _ => None,
        }
    }

    /// Attributes of a struct property or parameter.
    fn io_attributes(&self, attributes: &[Attribute], ty: TypeId, locations: &mut Locations) -> String {
        let mut out = self.builtin_attribute(ty).unwrap_or_default();
        for attribute in attributes {
            match attribute.name.as_str() {
                "Location" => {
                    if let Some(name) = attribute.args.first() {
                        let index = locations.index(&self.attribute_text(name));
                        out.push_str(&format!("@location({}) ", index));
                    }
                }
                "Interpolate" => {
                    let args: Vec<String> = attribute.args.iter().map(|a| self.attribute_text(a)).collect();
                    out.push_str(&format!("@interpolate({}) ", args.join(", ")));
                }
                _ => {}
            }
        }
        out
    }

    // --- Declarations ---

    pub fn format_document(&mut self) {
        let mut first = true;
        for decl in &self.document.declarations {
            if decl.build_in || matches!(decl.kind, DeclKind::Enum(_)) {
                continue;
            }
            if !first && self.config.blank_line_between_declarations {
                self.emit_newline();
            }
            first = false;
            self.format_decl(decl);
        }
    }

    fn format_decl(&mut self, decl: &Decl) {
        match &decl.kind {
            DeclKind::Alias(alias) => {
                let line = format!("alias {} = {};", alias.name, self.type_name(alias.ty.ty));
                self.emit_line(&line);
            }
            DeclKind::Struct(s) => self.format_struct(s),
            DeclKind::Function(f) => self.format_function(decl, f),
            DeclKind::Variable(v) => self.format_variable(decl, v),
            DeclKind::Enum(_) => {}
        }
    }

    fn format_struct(&mut self, s: &StructDecl) {
        self.emit_line(&format!("struct {} {{", s.name));
        self.indent += 1;
        let mut locations = Locations::default();
        for property in &s.properties {
            let attributes = self.io_attributes(&property.attributes, property.ty.ty, &mut locations);
            let line = format!("{}{}: {},", attributes, property.name, self.type_name(property.ty.ty));
            self.emit_line(&line);
        }
        self.indent -= 1;
        self.emit_line("}");
    }

    fn format_function(&mut self, decl: &Decl, f: &FunctionDecl) {
        let mut header = String::new();
        for attribute in decl.attributes.iter().filter(|a| is_entry_attribute(&a.name)) {
            match attribute.name.as_str() {
                "VertexEntry" => header.push_str("@vertex "),
                "FragmentEntry" => header.push_str("@fragment "),
                _ => {
                    let sizes: Vec<String> = attribute.args.iter().map(|a| self.expr_text(a)).collect();
                    header.push_str(&format!("@compute @workgroup_size({}) ", sizes.join(", ")));
                }
            }
        }

        let mut locations = Locations::default();
        let mut params = Vec::with_capacity(f.params.len());
        for param in &f.params {
            let attributes = self.io_attributes(&param.attributes, param.ty.ty, &mut locations);
            params.push(format!("{}{}: {}", attributes, param.name, self.type_name(param.ty.ty)));
        }
        header.push_str(&format!("fn {}({})", f.name, params.join(", ")));

        let return_ty = f.return_ty.ty;
        if !self.types.is_void(return_ty) {
            let builtin = self.builtin_attribute(return_ty).unwrap_or_default();
            header.push_str(&format!(" -> {}{}", builtin, self.type_name(return_ty)));
        }
        header.push_str(" {");

        self.emit_line(&header);
        self.format_block_body(&f.body);
        self.emit_line("}");
    }

    fn format_variable(&mut self, decl: &Decl, v: &VariableDecl) {
        let ty = self.type_name(v.ty.ty);
        let info = self.model.module_variable(&v.name);
        let space = info.map_or_else(
            || v.declaration_type.address_space(),
            |info| info.address_space(self.types),
        );
        let keyword = match space {
            AddressSpace::None if v.declaration_type == DeclarationType::Param => "override".to_string(),
            AddressSpace::None => "const".to_string(),
            AddressSpace::Function => "var<function>".to_string(),
            AddressSpace::Private => "var<private>".to_string(),
            AddressSpace::Workgroup => "var<workgroup>".to_string(),
            AddressSpace::Uniform => "var<uniform>".to_string(),
            AddressSpace::Handle => "var".to_string(),
            AddressSpace::Storage => {
                let read_only = info.is_some_and(|info| info.read_only);
                format!("var<storage, {}>", if read_only { "read" } else { "read_write" })
            }
        };

        let mut line = String::new();
        if let Some(group_binding) = decl.attribute("GroupBinding") {
            if let [group, binding] = &group_binding.args[..] {
                let (group, binding) = (self.attribute_text(group), self.attribute_text(binding));
                let (g, b) = self.bindings.index(&group, &binding);
                line.push_str(&format!("@group({}) @binding({}) ", g, b));
            }
        }
        line.push_str(&format!("{} {}: {}", keyword, v.name, ty));
        if let Some(init) = &v.init {
            line.push_str(" = ");
            line.push_str(&self.expr_text(init));
        }
        line.push(';');
        self.emit_line(&line);
    }

    // --- Statements ---

    fn format_block_body(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.statements {
            self.format_stmt(stmt);
        }
        self.indent -= 1;
    }

    fn format_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block(block) => {
                self.emit_line("{");
                self.format_block_body(block);
                self.emit_line("}");
            }
            StmtKind::If { .. } => {
                self.emit_indent();
                self.format_if(stmt);
                self.emit_newline();
            }
            StmtKind::Switch { selector, cases, default } => {
                let line = format!("switch ({}) {{", self.expr_text(selector));
                self.emit_line(&line);
                self.indent += 1;
                for case in cases {
                    let values: Vec<String> = case.values.iter().map(|v| self.expr_text(v)).collect();
                    self.emit_line(&format!("case {}: {{", values.join(", ")));
                    self.format_block_body(&case.body);
                    self.emit_line("}");
                }
                if let Some(default) = default {
                    self.emit_line("default: {");
                    self.format_block_body(default);
                    self.emit_line("}");
                }
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::For { init, condition, update, body } => {
                let init = init.as_ref().map(|s| self.simple_stmt_text(s)).unwrap_or_default();
                let condition = condition.as_ref().map(|c| self.expr_text(c)).unwrap_or_default();
                let update = update.as_ref().map(|s| self.simple_stmt_text(s)).unwrap_or_default();
                self.emit_line(&format!("for ({}; {}; {}) {{", init, condition, update));
                self.format_block_body(body);
                self.emit_line("}");
            }
            StmtKind::While { condition, body } => {
                let line = format!("while ({}) {{", self.expr_text(condition));
                self.emit_line(&line);
                self.format_block_body(body);
                self.emit_line("}");
            }
            StmtKind::DoWhile { body, condition } => {
                self.emit_line("loop {");
                self.format_block_body(body);
                self.indent += 1;
                self.emit_line("continuing {");
                self.indent += 1;
                let line = format!("break if !({});", self.expr_text(condition));
                self.emit_line(&line);
                self.indent -= 1;
                self.emit_line("}");
                self.indent -= 1;
                self.emit_line("}");
            }
            StmtKind::Break => self.emit_line("break;"),
            StmtKind::Continue => self.emit_line("continue;"),
            StmtKind::Discard => self.emit_line("discard;"),
            StmtKind::Return(None) => self.emit_line("return;"),
            StmtKind::Return(Some(value)) => {
                let line = format!("return {};", self.expr_text(value));
                self.emit_line(&line);
            }
            _ => {
                let line = format!("{};", self.simple_stmt_text(stmt));
                self.emit_line(&line);
            }
        }
    }

    /// `if` chains continue on the line of the closing brace.
    fn format_if(&mut self, stmt: &Stmt) {
        let StmtKind::If { condition, then_block, else_branch } = &stmt.kind else {
            return;
        };
        let head = format!("if ({}) {{", self.expr_text(condition));
        self.emit(&head);
        self.emit_newline();
        self.format_block_body(then_block);
        self.emit_indent();
        self.emit("}");
        match else_branch.as_deref() {
            Some(else_if @ Stmt { kind: StmtKind::If { .. }, .. }) => {
                self.emit(" else ");
                self.format_if(else_if);
            }
            Some(Stmt { kind: StmtKind::Block(block), .. }) => {
                self.emit(" else {");
                self.emit_newline();
                self.format_block_body(block);
                self.emit_indent();
                self.emit("}");
            }
            _ => {}
        }
    }

    /// Statements that can appear in a `for` header, without the `;`.
    fn simple_stmt_text(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Assignment { target, op, value } => {
                format!("{} {} {}", self.expr_text(target), op.symbol(), self.expr_text(value))
            }
            StmtKind::IncrementDecrement { target, increment } => {
                format!("{}{}", self.expr_text(target), if *increment { "++" } else { "--" })
            }
            StmtKind::Call(call) => self.expr_text(call),
            StmtKind::Variable(variable) => {
                // PGSL `let` is mutable, `const` is not.
                let keyword = match variable.kind {
                    LocalKind::Let => "var",
                    LocalKind::Const => "let",
                };
                let mut text = format!("{} {}: {}", keyword, variable.name, self.type_name(variable.ty.ty));
                if let Some(init) = &variable.init {
                    text.push_str(" = ");
                    text.push_str(&self.expr_text(init));
                }
                text
            }
            _ => String::new(),
        }
    }

    // --- Expressions ---

    fn format_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(literal) => self.emit(&literal.to_string()),
            ExprKind::String(s) => self.emit(&format!("\"{}\"", s)),
            ExprKind::Variable(name) => self.emit(name),
            ExprKind::EnumValue { enum_name, value } => match self.enum_value(enum_name, value) {
                Some(inner) => self.format_expr(inner),
                None => self.emit(value),
            },
            ExprKind::Unary { op, operand } => {
                self.emit(op.symbol());
                self.format_operand(operand, true);
            }
            ExprKind::Binary { op, left, right } => {
                self.format_operand(left, false);
                self.emit(" ");
                self.emit(op.symbol());
                self.emit(" ");
                self.format_operand(right, false);
            }
            ExprKind::Index { value, index } => {
                self.format_operand(value, true);
                self.emit("[");
                self.format_expr(index);
                self.emit("]");
            }
            ExprKind::Decomposition { value, property } => {
                self.format_operand(value, true);
                self.emit(".");
                self.emit(property);
            }
            ExprKind::AddressOf(operand) => {
                self.emit("&");
                self.format_operand(operand, true);
            }
            ExprKind::Deref(operand) => {
                self.emit("*");
                self.format_operand(operand, true);
            }
            ExprKind::Call { name, args } => {
                self.emit(name);
                self.format_args(args);
            }
            ExprKind::New { ty, args } => {
                let name = self.type_name(ty.ty);
                self.emit(&name);
                self.format_args(args);
            }
            ExprKind::Parenthesized(inner) => {
                self.emit("(");
                self.format_expr(inner);
                self.emit(")");
            }
        }
    }

    /// Binary operands of another operator are parenthesized. Under a prefix
    /// or postfix operator (`tight`) prefix expressions are too, so `- -x`
    /// never prints as the decrement token.
    fn format_operand(&mut self, expr: &Expr, tight: bool) {
        if self.needs_parens(expr, tight) {
            self.emit("(");
            self.format_expr(expr);
            self.emit(")");
        } else {
            self.format_expr(expr);
        }
    }

    fn needs_parens(&self, expr: &Expr, tight: bool) -> bool {
        match &expr.kind {
            ExprKind::Binary { .. } => true,
            ExprKind::Unary { .. } | ExprKind::AddressOf(_) | ExprKind::Deref(_) => tight,
            // Inlined values take the shape of their definition.
            ExprKind::EnumValue { enum_name, value } => {
                self.enum_value(enum_name, value).is_some_and(|inner| self.needs_parens(inner, tight))
            }
            _ => false,
        }
    }

    fn format_args(&mut self, args: &[Expr]) {
        self.emit("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.emit(", ");
            }
            self.format_expr(arg);
        }
        self.emit(")");
    }
}

fn numeric_name(kind: NumericKind) -> &'static str {
    match kind {
        NumericKind::Integer | NumericKind::AbstractInteger => "i32",
        NumericKind::UnsignedInteger => "u32",
        NumericKind::Float | NumericKind::AbstractFloat => "f32",
        NumericKind::Float16 => "f16",
    }
}
