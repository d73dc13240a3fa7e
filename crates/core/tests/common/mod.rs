#![allow(dead_code)]

//! Minimal class-file assembler for building test inputs byte by byte.

use std::collections::HashMap;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_SYNTHETIC: u16 = 0x1000;

const MAGIC: u32 = 0xCAFE_BABE;
const JAVA_8: u16 = 52;

/// Instructions the assembler knows how to encode. Member references are
/// `(owner, name, descriptor)` with internal owner names.
#[derive(Debug, Clone, Copy)]
pub enum Insn<'a> {
    Aload0,
    Iconst0,
    AconstNull,
    Pop,
    Dup,
    New(&'a str),
    GetField(&'a str, &'a str, &'a str),
    PutField(&'a str, &'a str, &'a str),
    GetStatic(&'a str, &'a str, &'a str),
    PutStatic(&'a str, &'a str, &'a str),
    InvokeVirtual(&'a str, &'a str, &'a str),
    InvokeSpecial(&'a str, &'a str, &'a str),
    InvokeStatic(&'a str, &'a str, &'a str),
    InvokeInterface(&'a str, &'a str, &'a str, u8),
    /// Call site `(name, descriptor)` with bootstrap method 0.
    InvokeDynamic(&'a str, &'a str),
    /// `getstatic` whose index points at a plain Utf8 entry instead of a
    /// field reference.
    GetStaticOfUtf8(&'a str),
    Return,
    AReturn,
    IReturn,
}

pub struct ClassAssembler {
    pool: Vec<Vec<u8>>,
    lookup: HashMap<Vec<u8>, u16>,
    this_class: u16,
    super_class: u16,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
}

impl ClassAssembler {
    /// A public class extending `java.lang.Object`; `name` is internal
    /// (`com/example/Bar`).
    pub fn new(name: &str) -> Self {
        let mut asm = Self {
            pool: Vec::new(),
            lookup: HashMap::new(),
            this_class: 0,
            super_class: 0,
            fields: Vec::new(),
            methods: Vec::new(),
        };
        asm.this_class = asm.class(name);
        asm.super_class = asm.class("java/lang/Object");
        asm
    }

    fn entry(&mut self, bytes: Vec<u8>) -> u16 {
        if let Some(&index) = self.lookup.get(&bytes) {
            return index;
        }
        self.pool.push(bytes.clone());
        let index = self.pool.len() as u16;
        self.lookup.insert(bytes, index);
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        let mut bytes = vec![1];
        bytes.extend((value.len() as u16).to_be_bytes());
        bytes.extend(value.as_bytes());
        self.entry(bytes)
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut bytes = vec![7];
        bytes.extend(name_index.to_be_bytes());
        self.entry(bytes)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = vec![12];
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        self.entry(bytes)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        let mut bytes = vec![tag];
        bytes.extend(class_index.to_be_bytes());
        bytes.extend(nat_index.to_be_bytes());
        self.entry(bytes)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(9, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(10, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(11, owner, name, descriptor)
    }

    pub fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> u16 {
        let nat_index = self.name_and_type(name, descriptor);
        let mut bytes = vec![18];
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(nat_index.to_be_bytes());
        self.entry(bytes)
    }

    pub fn field(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = Vec::new();
        bytes.extend(flags.to_be_bytes());
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        self.fields.push(bytes);
        self
    }

    pub fn method(mut self, flags: u16, name: &str, descriptor: &str, body: &[Insn<'_>]) -> Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let code_name = self.utf8("Code");
        let code = self.encode(body);

        let mut bytes = Vec::new();
        bytes.extend(flags.to_be_bytes());
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(code_name.to_be_bytes());
        bytes.extend((12 + code.len() as u32).to_be_bytes());
        bytes.extend(8u16.to_be_bytes()); // max_stack
        bytes.extend(8u16.to_be_bytes()); // max_locals
        bytes.extend((code.len() as u32).to_be_bytes());
        bytes.extend(&code);
        bytes.extend(0u16.to_be_bytes()); // exception table
        bytes.extend(0u16.to_be_bytes()); // code attributes
        self.methods.push(bytes);
        self
    }

    /// Shorthand for a method whose body is just a `return`.
    pub fn empty_method(self, flags: u16, name: &str, descriptor: &str) -> Self {
        self.method(flags, name, descriptor, &[Insn::Return])
    }

    fn encode(&mut self, body: &[Insn<'_>]) -> Vec<u8> {
        let mut code = Vec::new();
        for insn in body {
            match *insn {
                Insn::Aload0 => code.push(0x2a),
                Insn::Iconst0 => code.push(0x03),
                Insn::AconstNull => code.push(0x01),
                Insn::Pop => code.push(0x57),
                Insn::Dup => code.push(0x59),
                Insn::New(class) => {
                    let index = self.class(class);
                    code.push(0xbb);
                    code.extend(index.to_be_bytes());
                }
                Insn::GetStatic(o, n, d) => self.op(&mut code, 0xb2, o, n, d, false),
                Insn::PutStatic(o, n, d) => self.op(&mut code, 0xb3, o, n, d, false),
                Insn::GetField(o, n, d) => self.op(&mut code, 0xb4, o, n, d, false),
                Insn::PutField(o, n, d) => self.op(&mut code, 0xb5, o, n, d, false),
                Insn::InvokeVirtual(o, n, d) => self.op(&mut code, 0xb6, o, n, d, true),
                Insn::InvokeSpecial(o, n, d) => self.op(&mut code, 0xb7, o, n, d, true),
                Insn::InvokeStatic(o, n, d) => self.op(&mut code, 0xb8, o, n, d, true),
                Insn::InvokeInterface(o, n, d, count) => {
                    let index = self.interface_method_ref(o, n, d);
                    code.push(0xb9);
                    code.extend(index.to_be_bytes());
                    code.push(count);
                    code.push(0);
                }
                Insn::InvokeDynamic(n, d) => {
                    let index = self.invoke_dynamic(n, d);
                    code.push(0xba);
                    code.extend(index.to_be_bytes());
                    code.extend([0, 0]);
                }
                Insn::GetStaticOfUtf8(value) => {
                    let index = self.utf8(value);
                    code.push(0xb2);
                    code.extend(index.to_be_bytes());
                }
                Insn::Return => code.push(0xb1),
                Insn::AReturn => code.push(0xb0),
                Insn::IReturn => code.push(0xac),
            }
        }
        code
    }

    fn op(&mut self, code: &mut Vec<u8>, opcode: u8, owner: &str, name: &str, desc: &str, method: bool) {
        let index = if method {
            self.method_ref(owner, name, desc)
        } else {
            self.field_ref(owner, name, desc)
        };
        code.push(opcode);
        code.extend(index.to_be_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(MAGIC.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(JAVA_8.to_be_bytes());
        bytes.extend((self.pool.len() as u16 + 1).to_be_bytes());
        for entry in &self.pool {
            bytes.extend(entry);
        }
        bytes.extend((ACC_PUBLIC | ACC_SUPER).to_be_bytes());
        bytes.extend(self.this_class.to_be_bytes());
        bytes.extend(self.super_class.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // interfaces
        bytes.extend((self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            bytes.extend(field);
        }
        bytes.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            bytes.extend(method);
        }
        bytes.extend(0u16.to_be_bytes()); // class attributes
        bytes
    }
}

/// `super()` call that every constructor starts with.
pub const SUPER_INIT: [Insn<'static>; 2] = [
    Insn::Aload0,
    Insn::InvokeSpecial("java/lang/Object", "<init>", "()V"),
];

pub fn constructor(asm: ClassAssembler, flags: u16, descriptor: &str) -> ClassAssembler {
    let mut body = SUPER_INIT.to_vec();
    body.push(Insn::Return);
    asm.method(flags, "<init>", descriptor, &body)
}
