//! Access flags of classes and methods.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Class access and property modifiers
    pub struct ClassAccessFlags: u16 {
        /// Declared public; may be accessed from outside its package
        const PUBLIC = 0x0001;
        /// Declared final; no subclasses allowed
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by invokespecial
        const SUPER = 0x0020;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class
        const ENUM = 0x4000;
        /// Is a module, not a class or interface
        const MODULE = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method access and property modifiers
    pub struct MethodAccessFlags: u16 {
        /// Declared public
        const PUBLIC = 0x0001;
        /// Declared private
        const PRIVATE = 0x0002;
        /// Declared protected
        const PROTECTED = 0x0004;
        /// Declared static
        const STATIC = 0x0008;
        /// Declared final; must not be overridden
        const FINAL = 0x0010;
        /// Declared synchronized
        const SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler
        const BRIDGE = 0x0040;
        /// Declared with a variable number of arguments
        const VARARGS = 0x0080;
        /// Declared native
        const NATIVE = 0x0100;
        /// Declared abstract; no implementation is provided
        const ABSTRACT = 0x0400;
        /// In a class file whose major version is at least 46 and at most 60, declared strictfp
        const STRICT = 0x0800;
        /// Declared synthetic; not present in the source code
        const SYNTHETIC = 0x1000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_flags_keep_unknown_bits() {
        let flags = MethodAccessFlags::from_bits_retain(0x8009);
        assert!(flags.contains(MethodAccessFlags::STATIC));
        assert!(flags.contains(MethodAccessFlags::PUBLIC));
        assert_eq!(flags.bits(), 0x8009);
    }

    #[test]
    fn class_flags() {
        let flags = ClassAccessFlags::from_bits_retain(0x0621);
        assert!(flags.contains(ClassAccessFlags::INTERFACE | ClassAccessFlags::ABSTRACT));
        assert!(!flags.contains(ClassAccessFlags::ENUM));
    }
}
