use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::{
    ast::{BinaryOp, Type, UnaryOp},
    value::Value,
};

/// A lambda parameter, i.e. the per-element variable of a predicate,
/// selector or key selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

/// A field or property reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub declaring_type: Type,
    /// Type of the member's value
    pub ty: Type,
}

/// A method reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub declaring_type: Type,
    pub return_type: Type,
}

impl Member {
    pub fn new(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Member {
            name: name.into(),
            declaring_type,
            ty,
        }
    }
}

impl Method {
    pub fn new(declaring_type: Type, name: impl Into<String>, return_type: Type) -> Self {
        Method {
            name: name.into(),
            declaring_type,
            return_type,
        }
    }
}

/// Expression tree node of a composed query.
///
/// The tree is consumed read-only: every pass over it produces a new tree
/// and leaves the caller's nodes untouched. Child nodes are individually
/// boxed, so a node's address identifies it for the duration of a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a lambda parameter
    Parameter(Parameter),

    /// Field or property access
    ///
    /// `object` is `None` for static members.
    ///
    /// # Examples
    /// ```text
    /// x.Name
    /// DateTime.Now
    /// ```
    MemberAccess {
        object: Option<Box<Expr>>,
        member: Member,
    },

    /// Method call
    ///
    /// `object` is `None` for static methods, including the query operators
    /// whose first argument is the source sequence.
    ///
    /// # Examples
    /// ```text
    /// x.Name.StartsWith("A")
    /// Math.Abs(x.Balance)
    /// Queryable.Where(source, x => x.Age > 5)
    /// ```
    MethodCall {
        object: Option<Box<Expr>>,
        method: Method,
        args: Vec<Expr>,
    },

    /// Binary operation
    ///
    /// `conversion` carries the optional conversion lambda of a coalesce.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        conversion: Option<Box<Expr>>,
    },

    /// Unary operation, `ty` being the result type (the conversion target
    /// for `Convert`)
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        ty: Type,
    },

    /// Inline conditional (`test ? if_true : if_false`)
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },

    /// Literal value of a static type
    Constant { value: Value, ty: Type },

    /// Lambda expression
    Lambda {
        parameters: Vec<Parameter>,
        body: Box<Expr>,
    },

    /// Object allocation (`new T(args)`)
    New { ty: Type, args: Vec<Expr> },

    /// Object allocation followed by member initializers
    /// (`new T { A = .., B = .. }`)
    MemberInit {
        new: Box<Expr>,
        bindings: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn parameter(name: impl Into<String>, ty: Type) -> Self {
        Expr::Parameter(Parameter {
            name: name.into(),
            ty,
        })
    }

    pub fn constant(value: Value) -> Self {
        let ty = value.type_of();
        Expr::Constant { value, ty }
    }

    pub fn typed_constant(value: Value, ty: Type) -> Self {
        Expr::Constant { value, ty }
    }

    pub fn member(object: Expr, name: impl Into<String>, declaring_type: Type, ty: Type) -> Self {
        Expr::MemberAccess {
            object: Some(Box::new(object)),
            member: Member::new(declaring_type, name, ty),
        }
    }

    pub fn static_member(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Expr::MemberAccess {
            object: None,
            member: Member::new(declaring_type, name, ty),
        }
    }

    pub fn call(object: Expr, method: Method, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            object: Some(Box::new(object)),
            method,
            args,
        }
    }

    pub fn static_call(method: Method, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            object: None,
            method,
            args,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            conversion: None,
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            ty,
        }
    }

    pub fn not(operand: Expr) -> Self {
        let ty = operand.static_type();
        Expr::unary(UnaryOp::Not, operand, ty)
    }

    pub fn negate(operand: Expr) -> Self {
        let ty = operand.static_type();
        Expr::unary(UnaryOp::Negate, operand, ty)
    }

    pub fn convert(operand: Expr, ty: Type) -> Self {
        Expr::unary(UnaryOp::Convert, operand, ty)
    }

    pub fn quote(lambda: Expr) -> Self {
        let ty = lambda.static_type();
        Expr::unary(UnaryOp::Quote, lambda, ty)
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn lambda(parameters: Vec<Parameter>, body: Expr) -> Self {
        Expr::Lambda {
            parameters,
            body: Box::new(body),
        }
    }

    pub fn new_object(ty: Type, args: Vec<Expr>) -> Self {
        Expr::New { ty, args }
    }

    pub fn member_init(new: Expr, bindings: Vec<(String, Expr)>) -> Self {
        Expr::MemberInit {
            new: Box::new(new),
            bindings,
        }
    }

    pub fn as_parameter(&self) -> Option<&Parameter> {
        match self {
            Expr::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Expr::Parameter(_))
    }

    /// Binary comparison node (`==`, `!=`, `<`, `<=`, `>`, `>=`).
    pub fn is_comparison(&self) -> bool {
        matches!(self, Expr::Binary { op, .. } if op.is_comparison())
    }

    /// Node at the base of a query operator chain: the first argument of
    /// each call, followed until a node that is not a call.
    pub fn query_root(&self) -> &Expr {
        let mut node = self;
        while let Expr::MethodCall { args, .. } = node {
            match args.first() {
                Some(source) => node = source,
                None => break,
            }
        }
        node
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Parameter(_) | Expr::Constant { .. } => Vec::new(),
            Expr::MemberAccess { object, .. } => object.iter().map(|o| o.as_ref()).collect(),
            Expr::MethodCall { object, args, .. } => object
                .iter()
                .map(|o| o.as_ref())
                .chain(args.iter())
                .collect(),
            Expr::Binary {
                left,
                right,
                conversion,
                ..
            } => {
                let mut children = vec![left.as_ref(), right.as_ref()];
                children.extend(conversion.as_deref());
                children
            }
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => vec![test.as_ref(), if_true.as_ref(), if_false.as_ref()],
            Expr::Lambda { body, .. } => vec![body.as_ref()],
            Expr::New { args, .. } => args.iter().collect(),
            Expr::MemberInit { new, bindings } => std::iter::once(new.as_ref())
                .chain(bindings.iter().map(|(_, binding)| binding))
                .collect(),
        }
    }

    /// Rebuilds this node with every direct child replaced by `f(child)`.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let mut boxed = |e: &Expr| f(e).map(Box::new);
        Ok(match self {
            Expr::Parameter(_) | Expr::Constant { .. } => self.clone(),
            Expr::MemberAccess { object, member } => Expr::MemberAccess {
                object: object.as_deref().map(&mut boxed).transpose()?,
                member: member.clone(),
            },
            Expr::MethodCall {
                object,
                method,
                args,
            } => Expr::MethodCall {
                object: object.as_deref().map(&mut boxed).transpose()?,
                method: method.clone(),
                args: args.iter().map(|a| boxed(a).map(|b| *b)).collect::<Result<_, _>>()?,
            },
            Expr::Binary {
                op,
                left,
                right,
                conversion,
            } => Expr::Binary {
                op: *op,
                left: boxed(left)?,
                right: boxed(right)?,
                conversion: conversion.as_deref().map(&mut boxed).transpose()?,
            },
            Expr::Unary { op, operand, ty } => Expr::Unary {
                op: *op,
                operand: boxed(operand)?,
                ty: ty.clone(),
            },
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => Expr::Conditional {
                test: boxed(test)?,
                if_true: boxed(if_true)?,
                if_false: boxed(if_false)?,
            },
            Expr::Lambda { parameters, body } => Expr::Lambda {
                parameters: parameters.clone(),
                body: boxed(body)?,
            },
            Expr::New { ty, args } => Expr::New {
                ty: ty.clone(),
                args: args.iter().map(|a| boxed(a).map(|b| *b)).collect::<Result<_, _>>()?,
            },
            Expr::MemberInit { new, bindings } => Expr::MemberInit {
                new: boxed(new)?,
                bindings: bindings
                    .iter()
                    .map(|(name, b)| boxed(b).map(|b| (name.clone(), *b)))
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self.try_map_children(|e| Ok::<_, Infallible>(f(e))) {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }

    /// Static type of the value this node produces.
    pub fn static_type(&self) -> Type {
        match self {
            Expr::Parameter(p) => p.ty.clone(),
            Expr::MemberAccess { member, .. } => member.ty.clone(),
            Expr::MethodCall { method, .. } => method.return_type.clone(),
            Expr::Binary {
                op, left, right, ..
            } => match op {
                op if op.is_comparison() => Type::Boolean,
                BinaryOp::AndAlso | BinaryOp::OrElse => Type::Boolean,
                BinaryOp::Coalesce => right.static_type(),
                BinaryOp::ArrayIndex => left.static_type().element_type(),
                _ => left.static_type(),
            },
            Expr::Unary { ty, .. } => ty.clone(),
            Expr::Conditional { if_true, .. } => if_true.static_type(),
            Expr::Constant { ty, .. } => ty.clone(),
            Expr::Lambda { body, .. } => Type::named(format!("Func<{}>", body.static_type().name())),
            Expr::New { ty, .. } => ty.clone(),
            Expr::MemberInit { new, .. } => new.static_type(),
        }
    }
}
